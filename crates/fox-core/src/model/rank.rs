use core::fmt;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[repr(u8)]
pub enum Rank {
    One = 1,
    Two = 2,
    Three = 3,
    Four = 4,
    Five = 5,
    Six = 6,
    Seven = 7,
    Eight = 8,
    Nine = 9,
    Ten = 10,
    Eleven = 11,
}

impl Rank {
    pub const ORDERED: [Rank; 11] = [
        Rank::One,
        Rank::Two,
        Rank::Three,
        Rank::Four,
        Rank::Five,
        Rank::Six,
        Rank::Seven,
        Rank::Eight,
        Rank::Nine,
        Rank::Ten,
        Rank::Eleven,
    ];

    pub const fn from_value(value: u8) -> Option<Self> {
        match value {
            1 => Some(Rank::One),
            2 => Some(Rank::Two),
            3 => Some(Rank::Three),
            4 => Some(Rank::Four),
            5 => Some(Rank::Five),
            6 => Some(Rank::Six),
            7 => Some(Rank::Seven),
            8 => Some(Rank::Eight),
            9 => Some(Rank::Nine),
            10 => Some(Rank::Ten),
            11 => Some(Rank::Eleven),
            _ => None,
        }
    }

    pub const fn value(self) -> u8 {
        self as u8
    }

    /// Losing with this rank hands the next lead to its owner.
    pub const fn steals_lead(self) -> bool {
        matches!(self, Rank::One)
    }

    /// Playing this rank swaps the trump card with one from hand.
    pub const fn trades_trump(self) -> bool {
        matches!(self, Rank::Three)
    }

    /// Playing this rank draws a card then discards one face down.
    pub const fn draws_and_discards(self) -> bool {
        matches!(self, Rank::Five)
    }

    /// Worth one point to whoever wins it.
    pub const fn is_treasure(self) -> bool {
        matches!(self, Rank::Seven)
    }

    /// Counts as the trump suit when resolving a trick, unless paired.
    pub const fn joins_trump(self) -> bool {
        matches!(self, Rank::Nine)
    }

    /// Leading this rank forces the follower's 1 or highest card of the suit.
    pub const fn forces_follow(self) -> bool {
        matches!(self, Rank::Eleven)
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}

use crate::model::rank::Rank;
use crate::model::suit::Suit;
use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

pub const DECK_SIZE: usize = 33;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Card {
    pub suit: Suit,
    pub rank: Rank,
}

impl Card {
    pub const fn new(rank: Rank, suit: Suit) -> Self {
        Self { rank, suit }
    }

    /// Dense index in `0..DECK_SIZE`, suit-major.
    pub const fn to_id(self) -> u8 {
        self.suit as u8 * 11 + (self.rank.value() - 1)
    }

    pub const fn from_id(id: u8) -> Option<Self> {
        if id as usize >= DECK_SIZE {
            return None;
        }
        let suit = match Suit::from_index((id / 11) as usize) {
            Some(suit) => suit,
            None => return None,
        };
        match Rank::from_value(id % 11 + 1) {
            Some(rank) => Some(Card::new(rank, suit)),
            None => None,
        }
    }

    pub fn treasure_value(self) -> u32 {
        u32::from(self.rank.is_treasure())
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.rank, self.suit)
    }
}

/// Malformed card token.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("empty card token")]
    Empty,
    #[error("invalid rank in card token {0:?}")]
    Rank(String),
    #[error("invalid suit in card token {0:?}")]
    Suit(String),
}

impl FromStr for Card {
    type Err = DecodeError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        let mut chars = token.chars();
        let letter = chars.next_back().ok_or(DecodeError::Empty)?;
        let suit = Suit::from_letter(letter).ok_or_else(|| DecodeError::Suit(token.to_string()))?;
        let digits = chars.as_str();
        // Canonical tokens only: no sign, no leading zero.
        if digits.is_empty()
            || digits.starts_with('0')
            || !digits.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(DecodeError::Rank(token.to_string()));
        }
        let rank = digits
            .parse::<u8>()
            .ok()
            .and_then(Rank::from_value)
            .ok_or_else(|| DecodeError::Rank(token.to_string()))?;
        Ok(Card::new(rank, suit))
    }
}

impl Serialize for Card {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Card {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let token = String::deserialize(deserializer)?;
        token.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::{Card, DECK_SIZE, DecodeError};
    use crate::model::rank::Rank;
    use crate::model::suit::Suit;

    #[test]
    fn encodes_rank_then_suit_letter() {
        assert_eq!(Card::new(Rank::Ten, Suit::Spades).to_string(), "10s");
        assert_eq!(Card::new(Rank::One, Suit::Hearts).to_string(), "1h");
    }

    #[test]
    fn decodes_valid_tokens() {
        assert_eq!("10s".parse::<Card>(), Ok(Card::new(Rank::Ten, Suit::Spades)));
        assert_eq!("1h".parse::<Card>(), Ok(Card::new(Rank::One, Suit::Hearts)));
        assert_eq!("11c".parse::<Card>(), Ok(Card::new(Rank::Eleven, Suit::Clubs)));
    }

    #[test]
    fn malformed_tokens_are_rejected() {
        assert_eq!("".parse::<Card>(), Err(DecodeError::Empty));
        assert!(matches!("a".parse::<Card>(), Err(DecodeError::Suit(_))));
        assert!(matches!("s".parse::<Card>(), Err(DecodeError::Rank(_))));
        assert!(matches!("12h".parse::<Card>(), Err(DecodeError::Rank(_))));
        assert!(matches!("0h".parse::<Card>(), Err(DecodeError::Rank(_))));
        assert!(matches!("+1h".parse::<Card>(), Err(DecodeError::Rank(_))));
        assert!(matches!("01h".parse::<Card>(), Err(DecodeError::Rank(_))));
        assert!(matches!("010s".parse::<Card>(), Err(DecodeError::Rank(_))));
        assert!(matches!("5d".parse::<Card>(), Err(DecodeError::Suit(_))));
    }

    #[test]
    fn ids_cover_the_deck_once() {
        let mut seen = [false; DECK_SIZE];
        for id in 0..DECK_SIZE as u8 {
            let card = Card::from_id(id).expect("valid id");
            assert_eq!(card.to_id(), id);
            assert!(!seen[id as usize]);
            seen[id as usize] = true;
        }
        assert_eq!(Card::from_id(DECK_SIZE as u8), None);
    }

    #[test]
    fn serde_uses_text_codec() {
        let card = Card::new(Rank::Seven, Suit::Clubs);
        let json = serde_json::to_string(&card).unwrap();
        assert_eq!(json, "\"7c\"");
        let back: Card = serde_json::from_str(&json).unwrap();
        assert_eq!(back, card);
        assert!(serde_json::from_str::<Card>("\"7x\"").is_err());
    }
}

use crate::model::card::Card;
use crate::model::player::Player;
use serde::{Deserialize, Serialize};

pub const TRICKS_PER_GAME: usize = 13;

/// Bonus band a player lands in based on tricks won.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrickTier {
    Humble,
    Defeated,
    Victorious,
    Greedy,
}

impl TrickTier {
    pub const ALL: [TrickTier; 4] = [
        TrickTier::Humble,
        TrickTier::Defeated,
        TrickTier::Victorious,
        TrickTier::Greedy,
    ];

    pub const fn from_tricks(tricks: usize) -> Self {
        match tricks {
            0..=3 => TrickTier::Humble,
            4..=6 => TrickTier::Defeated,
            7..=9 => TrickTier::Victorious,
            _ => TrickTier::Greedy,
        }
    }

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            TrickTier::Humble => "humble",
            TrickTier::Defeated => "defeated",
            TrickTier::Victorious => "victorious",
            TrickTier::Greedy => "greedy",
        }
    }
}

pub const fn tier_bonus(tricks: usize) -> u32 {
    match tricks {
        0..=3 => 6,
        4 => 1,
        5 => 2,
        6 => 3,
        7..=9 => 6,
        _ => 0,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalScore {
    points: [u32; 2],
    tricks: [usize; 2],
}

impl FinalScore {
    /// Scores two piles of won cards. Tier bonuses apply only once every
    /// trick of the game has been played.
    pub fn from_discards(discards: &[Vec<Card>; 2]) -> Self {
        let tricks = [discards[0].len() / 2, discards[1].len() / 2];
        let complete = tricks[0] + tricks[1] == TRICKS_PER_GAME;
        let mut points = [0u32; 2];
        for player in Player::BOTH {
            let pile = &discards[player.index()];
            points[player.index()] = pile.iter().map(|card| card.treasure_value()).sum();
            if complete {
                points[player.index()] += tier_bonus(tricks[player.index()]);
            }
        }
        Self { points, tricks }
    }

    pub fn points(&self, player: Player) -> u32 {
        self.points[player.index()]
    }

    pub fn tricks(&self, player: Player) -> usize {
        self.tricks[player.index()]
    }

    pub fn tier(&self, player: Player) -> TrickTier {
        TrickTier::from_tricks(self.tricks(player))
    }

    pub fn standings(&self) -> &[u32; 2] {
        &self.points
    }

    /// Points of `player` minus points of the opponent.
    pub fn margin(&self, player: Player) -> i32 {
        self.points(player) as i32 - self.points(player.opponent()) as i32
    }

    pub fn winner(&self) -> Option<Player> {
        match self.margin(Player::Zero) {
            m if m > 0 => Some(Player::Zero),
            m if m < 0 => Some(Player::One),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{FinalScore, TrickTier, tier_bonus};
    use crate::model::card::Card;
    use crate::model::player::Player;
    use crate::model::rank::Rank;
    use crate::model::suit::Suit;

    fn pile(tricks: usize, sevens: usize) -> Vec<Card> {
        let mut cards: Vec<Card> = Suit::ALL
            .iter()
            .take(sevens)
            .map(|suit| Card::new(Rank::Seven, *suit))
            .collect();
        while cards.len() < tricks * 2 {
            cards.push(Card::new(Rank::Two, Suit::Hearts));
        }
        cards
    }

    #[test]
    fn tier_bonus_is_non_monotonic() {
        let bonuses: Vec<u32> = (0..=13).map(tier_bonus).collect();
        assert_eq!(bonuses, vec![6, 6, 6, 6, 1, 2, 3, 6, 6, 6, 0, 0, 0, 0]);
    }

    #[test]
    fn tiers_partition_trick_counts() {
        assert_eq!(TrickTier::from_tricks(3), TrickTier::Humble);
        assert_eq!(TrickTier::from_tricks(4), TrickTier::Defeated);
        assert_eq!(TrickTier::from_tricks(6), TrickTier::Defeated);
        assert_eq!(TrickTier::from_tricks(7), TrickTier::Victorious);
        assert_eq!(TrickTier::from_tricks(10), TrickTier::Greedy);
    }

    #[test]
    fn full_game_adds_treasures_and_tier_bonus() {
        let score = FinalScore::from_discards(&[pile(8, 2), pile(5, 1)]);
        assert_eq!(score.points(Player::Zero), 2 + 6);
        assert_eq!(score.points(Player::One), 1 + 2);
        assert_eq!(score.margin(Player::Zero), 5);
        assert_eq!(score.winner(), Some(Player::Zero));
        assert_eq!(score.tier(Player::One), TrickTier::Defeated);
    }

    #[test]
    fn partial_game_skips_tier_bonus() {
        let score = FinalScore::from_discards(&[pile(2, 1), pile(1, 0)]);
        assert_eq!(score.standings(), &[1, 0]);
    }

    #[test]
    fn greedy_player_can_lose() {
        let score = FinalScore::from_discards(&[pile(10, 3), pile(3, 0)]);
        assert_eq!(score.standings(), &[3, 6]);
        assert_eq!(score.winner(), Some(Player::One));
    }
}

use core::fmt;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Player {
    Zero = 0,
    One = 1,
}

impl Player {
    pub const BOTH: [Player; 2] = [Player::Zero, Player::One];

    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Player::Zero),
            1 => Some(Player::One),
            _ => None,
        }
    }

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn opponent(self) -> Player {
        match self {
            Player::Zero => Player::One,
            Player::One => Player::Zero,
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.index())
    }
}

#[cfg(test)]
mod tests {
    use super::Player;

    #[test]
    fn opponent_flips() {
        assert_eq!(Player::Zero.opponent(), Player::One);
        assert_eq!(Player::One.opponent(), Player::Zero);
    }

    #[test]
    fn index_roundtrip() {
        for (i, player) in Player::BOTH.iter().enumerate() {
            assert_eq!(Player::from_index(i), Some(*player));
            assert_eq!(player.index(), i);
        }
        assert_eq!(Player::from_index(2), None);
    }
}

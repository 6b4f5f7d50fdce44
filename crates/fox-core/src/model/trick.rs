use crate::model::card::Card;
use crate::model::player::Player;
use crate::model::suit::Suit;

/// Result of a completed trick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrickOutcome {
    pub winner: Player,
    pub next_leader: Player,
}

/// Suit a trick card counts as while the trick is resolved. An unpaired 9
/// joins the trump suit; two 9s keep their own suits.
pub fn effective_suit(card: Card, other: Card, trump: Option<Suit>) -> Suit {
    match trump {
        Some(trump) if card.rank.joins_trump() && !other.rank.joins_trump() => trump,
        _ => card.suit,
    }
}

/// Resolves a full trick. `cards` is indexed by player.
pub fn resolve(leader: Player, cards: [Card; 2], trump: Option<Suit>) -> TrickOutcome {
    let [first, second] = cards;
    let suits = [
        effective_suit(first, second, trump),
        effective_suit(second, first, trump),
    ];

    let winner = if suits[0] == suits[1] {
        if first.rank > second.rank {
            Player::Zero
        } else {
            Player::One
        }
    } else if Some(suits[0]) == trump {
        Player::Zero
    } else if Some(suits[1]) == trump {
        Player::One
    } else {
        leader
    };

    let loser = winner.opponent();
    let next_leader = if cards[loser.index()].rank.steals_lead() {
        loser
    } else {
        winner
    };

    TrickOutcome {
        winner,
        next_leader,
    }
}

use crate::game::state::DerivedState;
use crate::model::card::Card;
use crate::model::player::Player;
use crate::model::rank::Rank;
use core::fmt;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A card played by a given player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    pub player: Player,
    pub card: Card,
}

impl Move {
    pub const fn new(player: Player, card: Card) -> Self {
        Self { player, card }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.player, self.card)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LegalityError {
    #[error("game is over")]
    GameOver,
    #[error("expected {expected} to play but got {actual}")]
    NotYourTurn { expected: Player, actual: Player },
    #[error("{player} does not hold {card}")]
    CardNotInHand { player: Player, card: Card },
    #[error("{card} does not follow the lead {lead}")]
    MustFollowSuit { lead: Card, card: Card },
    #[error("{card} is not allowed against {lead}; play the 1 or the highest card of the suit")]
    ForcedByEleven { lead: Card, card: Card },
}

/// Validates `card` for `player` in `state`.
pub fn check_move(state: &DerivedState, player: Player, card: Card) -> Result<(), LegalityError> {
    if state.is_over() {
        return Err(LegalityError::GameOver);
    }
    if state.current_player() != player {
        return Err(LegalityError::NotYourTurn {
            expected: state.current_player(),
            actual: player,
        });
    }
    let hand = state.hand(player);
    if !hand.contains(card) {
        return Err(LegalityError::CardNotInHand { player, card });
    }

    // Follow-up of a 3 or a 5, or a free lead.
    let Some(lead) = state.lead_card(player) else {
        return Ok(());
    };
    if !hand.has_suit(lead.suit) {
        return Ok(());
    }
    if card.suit != lead.suit {
        return Err(LegalityError::MustFollowSuit { lead, card });
    }
    if lead.rank.forces_follow()
        && card.rank != Rank::One
        && hand.highest_of(lead.suit) != Some(card)
    {
        return Err(LegalityError::ForcedByEleven { lead, card });
    }
    Ok(())
}

pub fn is_legal(state: &DerivedState, player: Player, card: Card) -> bool {
    check_move(state, player, card).is_ok()
}

/// Moves `player` may make now. Empty when it is not their turn.
pub fn allowed_moves(state: &DerivedState, player: Player) -> Vec<Move> {
    if state.is_over() || state.current_player() != player {
        return Vec::new();
    }
    let hand = state.hand(player);
    let all = || -> Vec<Move> { hand.iter().map(|&card| Move::new(player, card)).collect() };

    let Some(lead) = state.lead_card(player) else {
        return all();
    };
    if !hand.has_suit(lead.suit) {
        return all();
    }
    if lead.rank.forces_follow() {
        let one = Card::new(Rank::One, lead.suit);
        let mut moves = Vec::with_capacity(2);
        if hand.contains(one) {
            moves.push(Move::new(player, one));
        }
        if let Some(best) = hand.highest_of(lead.suit) {
            if best != one {
                moves.push(Move::new(player, best));
            }
        }
        return moves;
    }
    hand.iter()
        .filter(|card| card.suit == lead.suit)
        .map(|&card| Move::new(player, card))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{LegalityError, Move, allowed_moves, check_move, is_legal};
    use crate::game::state::DerivedState;
    use crate::model::card::Card;
    use crate::model::player::Player;

    fn card(token: &str) -> Card {
        token.parse().unwrap()
    }

    fn deal(p0: &str, p1: &str) -> DerivedState {
        let slots = |tokens: &str| -> Vec<Option<Card>> {
            tokens.split_whitespace().map(|t| Some(card(t))).collect()
        };
        DerivedState::from_deal(
            Player::Zero,
            &[slots(p0), slots(p1)],
            card("2s"),
            &slots("4s 6s"),
        )
    }

    #[test]
    fn eleven_forces_one_or_highest() {
        let mut state = deal("11h 2c", "3h 8h 1h 10c");
        state.advance(Player::Zero, Some(card("11h"))).unwrap();
        let moves: Vec<Card> = allowed_moves(&state, Player::One)
            .into_iter()
            .map(|m| m.card)
            .collect();
        assert_eq!(moves, vec![card("1h"), card("8h")]);
        assert_eq!(
            check_move(&state, Player::One, card("3h")),
            Err(LegalityError::ForcedByEleven {
                lead: card("11h"),
                card: card("3h")
            })
        );
        assert!(is_legal(&state, Player::One, card("1h")));
        assert!(is_legal(&state, Player::One, card("8h")));
    }

    #[test]
    fn eleven_with_only_the_one_lists_it_once() {
        let mut state = deal("11h 2c", "1h 10c");
        state.advance(Player::Zero, Some(card("11h"))).unwrap();
        assert_eq!(
            allowed_moves(&state, Player::One),
            vec![Move::new(Player::One, card("1h"))]
        );
    }

    #[test]
    fn must_follow_suit_when_able() {
        let mut state = deal("4c 2h", "3h 8h 10c");
        state.advance(Player::Zero, Some(card("4c"))).unwrap();
        assert_eq!(
            allowed_moves(&state, Player::One),
            vec![Move::new(Player::One, card("10c"))]
        );
        assert_eq!(
            check_move(&state, Player::One, card("3h")),
            Err(LegalityError::MustFollowSuit {
                lead: card("4c"),
                card: card("3h")
            })
        );
    }

    #[test]
    fn void_in_lead_suit_allows_any_card() {
        let mut state = deal("4s 2h", "3h 8h 10c");
        state.advance(Player::Zero, Some(card("4s"))).unwrap();
        assert_eq!(allowed_moves(&state, Player::One).len(), 3);
    }

    #[test]
    fn follow_up_of_special_is_free() {
        let mut state = deal("5c 2h 9s", "3h 8h 10c");
        state.advance(Player::Zero, Some(card("5c"))).unwrap();
        // Drew 4s; any held card may be discarded.
        let moves = allowed_moves(&state, Player::Zero);
        assert_eq!(moves.len(), 3);
        assert!(is_legal(&state, Player::Zero, card("4s")));
    }

    #[test]
    fn not_your_turn_yields_nothing() {
        let state = deal("4c 2h", "3h 8h");
        assert!(allowed_moves(&state, Player::One).is_empty());
        assert_eq!(
            check_move(&state, Player::One, card("3h")),
            Err(LegalityError::NotYourTurn {
                expected: Player::Zero,
                actual: Player::One
            })
        );
        assert_eq!(
            check_move(&state, Player::Zero, card("3h")),
            Err(LegalityError::CardNotInHand {
                player: Player::Zero,
                card: card("3h")
            })
        );
    }

    #[test]
    fn allowed_moves_are_all_legal_and_distinct() {
        let state = deal("4c 2h 11h 1h", "3h 8h 5s 6c");
        let moves = allowed_moves(&state, Player::Zero);
        let mut unique = moves.clone();
        unique.dedup();
        assert_eq!(unique.len(), moves.len());
        assert!(moves.iter().all(|m| is_legal(&state, m.player, m.card)));
    }
}

use crate::game::rules::{self, LegalityError};
use crate::game::state::{ConservationViolation, DerivedState, Pending, StepRole};
use crate::model::card::{Card, DECK_SIZE};
use crate::model::deck::Deck;
use crate::model::player::Player;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

pub const HAND_SIZE: usize = 13;
pub const DRAW_PILE_SIZE: usize = 6;

/// Card a special play pulled into the player's hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Effect {
    /// Top card of the draw pile, hidden from the opponent.
    Drew(Option<Card>),
    /// The trump card taken back by a 3.
    TookTrump(Card),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Play {
    pub player: Player,
    pub card: Option<Card>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effect: Option<Effect>,
}

/// Initial deal plus the append-only play log. `None` slots are cards the
/// owner of a redacted record cannot see.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRecord {
    first_player: Player,
    hands: [Vec<Option<Card>>; 2],
    draw_pile: Vec<Option<Card>>,
    trump: Card,
    plays: Vec<Play>,
}

impl GameRecord {
    pub fn new_game<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let cards = Deck::shuffled(rng).into_cards();
        let first_player = if rng.gen_bool(0.5) {
            Player::Zero
        } else {
            Player::One
        };
        Self::from_cards(first_player, &cards)
    }

    pub fn with_seed(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        Self::new_game(&mut rng)
    }

    /// Deals a full deck in order: 13 cards each, the trump, then the pile.
    fn from_cards(first_player: Player, cards: &[Card]) -> Self {
        debug_assert_eq!(cards.len(), DECK_SIZE);
        let known = |range: &[Card]| range.iter().copied().map(Some).collect::<Vec<_>>();
        Self {
            first_player,
            hands: [
                known(&cards[..HAND_SIZE]),
                known(&cards[HAND_SIZE..2 * HAND_SIZE]),
            ],
            trump: cards[2 * HAND_SIZE],
            draw_pile: known(&cards[2 * HAND_SIZE + 1..]),
            plays: Vec::new(),
        }
    }

    /// Builds a record from an explicit deal, checking the deck is whole.
    pub fn from_deal(
        first_player: Player,
        hands: [Vec<Card>; 2],
        trump: Card,
        draw_pile: Vec<Card>,
    ) -> Result<Self, ConservationViolation> {
        let record = Self {
            first_player,
            hands: hands.map(|hand| hand.into_iter().map(Some).collect()),
            draw_pile: draw_pile.into_iter().map(Some).collect(),
            trump,
            plays: Vec::new(),
        };
        record.initial_state().check_conservation()?;
        Ok(record)
    }

    pub fn first_player(&self) -> Player {
        self.first_player
    }

    pub fn initial_hand(&self, player: Player) -> &[Option<Card>] {
        &self.hands[player.index()]
    }

    pub fn initial_draw_pile(&self) -> &[Option<Card>] {
        &self.draw_pile
    }

    pub fn initial_trump(&self) -> Card {
        self.trump
    }

    pub fn plays(&self) -> &[Play] {
        &self.plays
    }

    fn initial_state(&self) -> DerivedState {
        DerivedState::from_deal(self.first_player, &self.hands, self.trump, &self.draw_pile)
    }

    /// Replays the log. Panics on a broken deck invariant.
    pub fn derive(&self) -> DerivedState {
        self.derive_prefix(self.plays.len())
    }

    /// Replays the first `len` plays.
    pub fn derive_prefix(&self, len: usize) -> DerivedState {
        match self.try_derive_prefix(len) {
            Ok(state) => state,
            Err(violation) => panic!("conservation violated while replaying: {violation}"),
        }
    }

    pub fn try_derive_prefix(&self, len: usize) -> Result<DerivedState, ConservationViolation> {
        let mut state = self.initial_state();
        for play in self.plays.iter().take(len) {
            state.advance(play.player, play.card)?;
        }
        state.check_conservation()?;
        Ok(state)
    }

    /// Validates and appends a move. The record is untouched on error.
    pub fn push_move(&mut self, player: Player, card: Card) -> Result<(), LegalityError> {
        let state = self.derive();
        rules::check_move(&state, player, card)?;
        let holds_more = state.hand(player).len() > 1;
        let effect = if !state.pending().is_none() || !holds_more {
            None
        } else if card.rank.draws_and_discards() {
            state.draw_pile().first().map(|top| Effect::Drew(*top))
        } else if card.rank.trades_trump() {
            state.trump().map(Effect::TookTrump)
        } else {
            None
        };
        self.plays.push(Play {
            player,
            card: Some(card),
            effect,
        });
        Ok(())
    }

    pub fn apply_move(&self, player: Player, card: Card) -> Result<GameRecord, LegalityError> {
        let mut next = self.clone();
        next.push_move(player, card)?;
        Ok(next)
    }

    /// Copy of the record as `viewer` knows it: the opponent's hand, the
    /// undrawn pile and the opponent's face-down discards become `None`.
    /// Applying it to an already redacted record changes nothing.
    pub fn player_view(&self, viewer: Player) -> GameRecord {
        let mut view = self.clone();
        view.hands[viewer.opponent().index()].fill(None);

        let steps = self.derive().steps().to_vec();
        let mut revealed = vec![false; self.draw_pile.len()];
        let mut drawn = 0usize;
        for (index, step) in steps.iter().enumerate() {
            let play = &mut view.plays[index];
            if step.opened == Pending::DrawDiscard {
                if step.player == viewer {
                    if let Some(flag) = revealed.get_mut(drawn) {
                        *flag = true;
                    }
                } else {
                    play.effect = Some(Effect::Drew(None));
                }
                drawn += 1;
            }
            if step.role == StepRole::Discard && step.player != viewer {
                play.card = None;
            }
        }
        for (slot, keep) in view.draw_pile.iter_mut().zip(revealed) {
            if !keep {
                *slot = None;
            }
        }
        view
    }

    /// True when no slot of the record is hidden.
    pub fn is_complete(&self) -> bool {
        self.hands.iter().flatten().all(Option::is_some)
            && self.draw_pile.iter().all(Option::is_some)
            && self.plays.iter().all(|play| play.card.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::{Effect, GameRecord};
    use crate::game::rules::{LegalityError, allowed_moves};
    use crate::game::state::Pending;
    use crate::model::card::Card;
    use crate::model::player::Player;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rand::seq::SliceRandom;

    fn card(token: &str) -> Card {
        token.parse().unwrap()
    }

    fn cards(tokens: &str) -> Vec<Card> {
        tokens.split_whitespace().map(card).collect()
    }

    /// Hearts to P0, spades to P1, clubs split between trump and pile.
    fn fixed_record() -> GameRecord {
        GameRecord::from_deal(
            Player::Zero,
            [
                cards("1h 2h 3h 4h 5h 6h 7h 8h 9h 10h 11h 1c 2c"),
                cards("1s 2s 3s 4s 5s 6s 7s 8s 9s 10s 11s 3c 4c"),
            ],
            card("5c"),
            cards("6c 7c 8c 9c 10c 11c"),
        )
        .unwrap()
    }

    fn play_random(record: &mut GameRecord, seed: u64, moves: usize) {
        let mut rng = StdRng::seed_from_u64(seed);
        for _ in 0..moves {
            let state = record.derive();
            if state.is_over() {
                break;
            }
            let player = state.current_player();
            let choice = *allowed_moves(&state, player).choose(&mut rng).unwrap();
            record.push_move(player, choice.card).unwrap();
        }
    }

    #[test]
    fn new_game_deals_13_13_1_6() {
        let record = GameRecord::with_seed(7);
        assert_eq!(record.initial_hand(Player::Zero).len(), 13);
        assert_eq!(record.initial_hand(Player::One).len(), 13);
        assert_eq!(record.initial_draw_pile().len(), 6);
        assert!(record.plays().is_empty());
        assert!(record.is_complete());
        record.derive().check_conservation().unwrap();
    }

    #[test]
    fn from_deal_rejects_duplicates() {
        let result = GameRecord::from_deal(
            Player::Zero,
            [
                cards("1h 1h 3h 4h 5h 6h 7h 8h 9h 10h 11h 1c 2c"),
                cards("1s 2s 3s 4s 5s 6s 7s 8s 9s 10s 11s 3c 4c"),
            ],
            card("5c"),
            cards("6c 7c 8c 9c 10c 11c"),
        );
        assert!(result.is_err());
    }

    #[test]
    fn illegal_move_leaves_record_untouched() {
        let record = fixed_record();
        let err = record.apply_move(Player::One, card("1s")).unwrap_err();
        assert!(matches!(err, LegalityError::NotYourTurn { .. }));
        assert!(record.plays().is_empty());

        let mut in_place = record.clone();
        assert!(in_place.push_move(Player::Zero, card("1s")).is_err());
        assert_eq!(in_place, record);
    }

    #[test]
    fn five_records_the_drawn_card() {
        let record = fixed_record().apply_move(Player::Zero, card("5h")).unwrap();
        assert_eq!(
            record.plays()[0].effect,
            Some(Effect::Drew(Some(card("6c"))))
        );
        let state = record.derive();
        assert_eq!(state.pending(), Pending::DrawDiscard);
        assert!(state.hand(Player::Zero).contains(card("6c")));
    }

    #[test]
    fn three_records_the_old_trump() {
        let record = fixed_record().apply_move(Player::Zero, card("3h")).unwrap();
        assert_eq!(
            record.plays()[0].effect,
            Some(Effect::TookTrump(card("5c")))
        );
    }

    #[test]
    fn view_masks_opponent_and_pile() {
        let record = fixed_record()
            .apply_move(Player::Zero, card("5h"))
            .and_then(|r| r.apply_move(Player::Zero, card("1c")))
            .unwrap();

        let mine = record.player_view(Player::Zero);
        assert!(mine.initial_hand(Player::One).iter().all(Option::is_none));
        assert_eq!(mine.initial_draw_pile()[0], Some(card("6c")));
        assert!(mine.initial_draw_pile()[1..].iter().all(Option::is_none));
        assert_eq!(mine.plays()[1].card, Some(card("1c")));

        let theirs = record.player_view(Player::One);
        assert!(theirs.initial_hand(Player::Zero).iter().all(Option::is_none));
        assert!(theirs.initial_draw_pile().iter().all(Option::is_none));
        assert_eq!(theirs.plays()[0].card, Some(card("5h")));
        assert_eq!(theirs.plays()[0].effect, Some(Effect::Drew(None)));
        assert_eq!(theirs.plays()[1].card, None);
        assert!(!theirs.is_complete());
    }

    #[test]
    fn view_is_idempotent() {
        let mut record = GameRecord::with_seed(11);
        play_random(&mut record, 3, 17);
        for viewer in Player::BOTH {
            let view = record.player_view(viewer);
            assert_eq!(view.player_view(viewer), view);
        }
    }

    #[test]
    fn view_replays_with_same_shape() {
        let mut record = GameRecord::with_seed(5);
        play_random(&mut record, 9, 20);
        let full = record.derive();
        for viewer in Player::BOTH {
            let seen = record.player_view(viewer).derive();
            assert_eq!(seen.current_player(), full.current_player());
            assert_eq!(seen.pending(), full.pending());
            assert_eq!(seen.trick(), full.trick());
            assert_eq!(seen.trump(), full.trump());
            assert_eq!(seen.hand(viewer), full.hand(viewer));
            for player in Player::BOTH {
                assert_eq!(seen.hand(player).len(), full.hand(player).len());
                assert_eq!(seen.discards(player), full.discards(player));
            }
            assert_eq!(seen.draw_pile().len(), full.draw_pile().len());
        }
    }

    #[test]
    #[should_panic(expected = "conservation violated")]
    fn forged_record_panics_on_replay() {
        let mut record = fixed_record();
        record.plays.push(super::Play {
            player: Player::Zero,
            card: Some(card("1s")),
            effect: None,
        });
        let _ = record.derive();
    }
}

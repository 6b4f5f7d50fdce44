//! Determinization: one concrete world consistent with a [`Knowledge`].

use super::Knowledge;
use crate::game::state::DerivedState;
use crate::model::card::Card;
use crate::model::hand::Hand;
use rand::Rng;
use rand::seq::SliceRandom;

/// Fills every hidden slot of an observer's state.
#[derive(Debug, Default)]
pub struct Determinizer;

impl Determinizer {
    /// Deals the unseen cards into the opponent's hand, the opponent's
    /// face-down discards and the draw pile. Constraints are relaxed rather
    /// than failing when too few candidates remain for the hand.
    pub fn sample<R: Rng + ?Sized>(
        view: &DerivedState,
        knowledge: &Knowledge,
        rng: &mut R,
    ) -> DerivedState {
        let mut pool: Vec<Card> = knowledge.candidates().to_vec();
        let mut draw_only: Vec<Card> = knowledge.draw_only().to_vec();
        let mut max_one = knowledge.max_one_suits();
        pool.shuffle(rng);

        let mut dealt: Vec<Card> = Vec::with_capacity(knowledge.opponent_hidden());
        for _ in 0..knowledge.opponent_hidden() {
            let card = match pool.pop() {
                Some(card) => card,
                None => {
                    draw_only.shuffle(rng);
                    match draw_only.pop() {
                        Some(card) => card,
                        None => break,
                    }
                }
            };
            if max_one.contains(card.suit) {
                max_one = max_one.without(card.suit);
                let (same, rest): (Vec<Card>, Vec<Card>) =
                    pool.into_iter().partition(|other| other.suit == card.suit);
                pool = rest;
                draw_only.extend(same);
            }
            dealt.push(card);
        }

        let mut leftover = pool;
        leftover.extend(draw_only);
        leftover.shuffle(rng);

        let opponent = knowledge.observer().opponent();
        let mut world = view.clone();

        let hand = &mut world.hands[opponent.index()];
        let mut cards: Vec<Card> = hand.cards().to_vec();
        cards.extend(dealt);
        *hand = Hand::with_cards(cards);

        for slot in world.private_discards[opponent.index()].iter_mut() {
            if slot.is_none() {
                *slot = leftover.pop();
            }
        }
        for slot in world.draw_pile.iter_mut() {
            if slot.is_none() {
                *slot = leftover.pop();
            }
        }

        debug_assert!(world.is_fully_known());
        debug_assert!(world.check_conservation().is_ok());
        world
    }
}

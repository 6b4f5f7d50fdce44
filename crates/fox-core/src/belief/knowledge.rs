//! Observer-relative constraints on the cards a player cannot see.

use crate::game::state::{DerivedState, Pending, StepRole};
use crate::model::card::{Card, DECK_SIZE};
use crate::model::player::Player;
use crate::model::rank::Rank;
use crate::model::suit::Suit;
use std::collections::BTreeSet;

/// Bit-mask over the three suits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SuitMask(u8);

impl SuitMask {
    pub const EMPTY: Self = Self(0);

    pub fn contains(self, suit: Suit) -> bool {
        let bit = 1 << suit as u8;
        self.0 & bit != 0
    }

    pub fn with(mut self, suit: Suit) -> Self {
        let bit = 1 << suit as u8;
        self.0 |= bit;
        self
    }

    pub fn without(mut self, suit: Suit) -> Self {
        let bit = 1 << suit as u8;
        self.0 &= !bit;
        self
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = Suit> {
        Suit::ALL.into_iter().filter(move |suit| self.contains(*suit))
    }
}

/// What `observer` can deduce about hidden cards from the play log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Knowledge {
    observer: Player,
    candidates: Vec<Card>,
    draw_only: Vec<Card>,
    known_opponent: Vec<Card>,
    max_one: SuitMask,
    cuts: SuitMask,
    pending: Pending,
    opponent_hidden: usize,
    opponent_private_hidden: usize,
    pile_hidden: usize,
}

impl Knowledge {
    /// Builds the constraint set from `state` as derived from
    /// `observer`'s redacted record.
    pub fn extract(state: &DerivedState, observer: Player) -> Self {
        let opponent = observer.opponent();

        let mut seen = [false; DECK_SIZE];
        for card in state.visible_cards() {
            seen[card.to_id() as usize] = true;
        }
        let unseen: Vec<Card> = (0..DECK_SIZE as u8)
            .filter(|id| !seen[*id as usize])
            .filter_map(Card::from_id)
            .collect();

        let mut cuts = SuitMask::EMPTY;
        let mut max_one = SuitMask::EMPTY;
        let mut excluded: BTreeSet<Card> = BTreeSet::new();
        let mut lead: Option<(Player, Card)> = None;
        let mut trump = Some(state.initial_trump());
        // Former trumps the opponent took with a 3 and has not played yet.
        let mut traded: Vec<Card> = Vec::new();

        for step in state.steps() {
            if step.player == opponent {
                if let Some(card) = step.card {
                    if let Some(index) = traded.iter().position(|known| *known == card) {
                        traded.swap_remove(index);
                    } else if step.role != StepRole::Discard && max_one.contains(card.suit) {
                        // Their last card of the suit is gone.
                        max_one = max_one.without(card.suit);
                        cuts = cuts.with(card.suit);
                    }
                }
            }

            match step.role {
                StepRole::Lead => lead = step.card.map(|card| (step.player, card)),
                StepRole::Response => {
                    if let (Some((leader, led)), Some(card)) = (lead, step.card) {
                        if leader == observer && step.player == opponent {
                            if card.suit != led.suit {
                                cuts = cuts.with(led.suit);
                                max_one = max_one.without(led.suit);
                            } else if led.rank.forces_follow() && card.rank != Rank::One {
                                for value in card.rank.value() + 1..Rank::Eleven.value() {
                                    if let Some(rank) = Rank::from_value(value) {
                                        excluded.insert(Card::new(rank, led.suit));
                                    }
                                }
                            }
                        }
                    }
                    lead = None;
                }
                StepRole::NewTrump => trump = step.card,
                StepRole::Discard => {}
            }

            if step.opened == Pending::TrumpTrade {
                let former = trump.take();
                if step.player == opponent {
                    traded.extend(former);
                }
            }
            if step.player == opponent && step.opened == Pending::DrawDiscard {
                // An unseen draw: voids become "at most one", the rest resets.
                max_one = cuts;
                cuts = SuitMask::EMPTY;
                excluded.clear();
                traded.clear();
            }
        }

        let (draw_only, candidates): (Vec<Card>, Vec<Card>) = unseen
            .into_iter()
            .partition(|card| cuts.contains(card.suit) || excluded.contains(card));

        let opponent_hand = state.hand(opponent);
        let knowledge = Self {
            observer,
            candidates,
            draw_only,
            known_opponent: opponent_hand.cards().to_vec(),
            max_one,
            cuts,
            pending: state.pending(),
            opponent_hidden: opponent_hand.hidden(),
            opponent_private_hidden: state
                .private_discards(opponent)
                .iter()
                .filter(|slot| slot.is_none())
                .count(),
            pile_hidden: state.draw_pile().iter().filter(|slot| slot.is_none()).count(),
        };
        debug_assert_eq!(knowledge.unseen_count(), knowledge.hidden_slots());
        knowledge
    }

    pub fn observer(&self) -> Player {
        self.observer
    }

    /// Unseen cards that may sit in the opponent's hand.
    pub fn candidates(&self) -> &[Card] {
        &self.candidates
    }

    /// Unseen cards proven absent from the opponent's hand.
    pub fn draw_only(&self) -> &[Card] {
        &self.draw_only
    }

    pub fn known_opponent_cards(&self) -> &[Card] {
        &self.known_opponent
    }

    pub fn max_one_suits(&self) -> SuitMask {
        self.max_one
    }

    pub fn cut_suits(&self) -> SuitMask {
        self.cuts
    }

    pub fn pending(&self) -> Pending {
        self.pending
    }

    pub fn opponent_hidden(&self) -> usize {
        self.opponent_hidden
    }

    pub fn opponent_private_hidden(&self) -> usize {
        self.opponent_private_hidden
    }

    pub fn pile_hidden(&self) -> usize {
        self.pile_hidden
    }

    pub fn unseen_count(&self) -> usize {
        self.candidates.len() + self.draw_only.len()
    }

    pub fn hidden_slots(&self) -> usize {
        self.opponent_hidden + self.opponent_private_hidden + self.pile_hidden
    }
}

use crate::model::card::{Card, DECK_SIZE};
use crate::model::rank::Rank;
use crate::model::suit::Suit;
use rand::Rng;
use rand::seq::SliceRandom;

/// The 33 cards: ranks 1 to 11 in each of the three suits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deck(Vec<Card>);

impl Deck {
    /// Suit-major, rank-ascending order.
    pub fn ordered() -> Self {
        let cards: Vec<Card> = Suit::ALL
            .into_iter()
            .flat_map(|suit| Rank::ORDERED.into_iter().map(move |rank| Card::new(rank, suit)))
            .collect();
        debug_assert_eq!(cards.len(), DECK_SIZE);
        Self(cards)
    }

    pub fn shuffled<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut deck = Self::ordered();
        deck.0.shuffle(rng);
        deck
    }

    pub fn cards(&self) -> &[Card] {
        &self.0
    }

    pub fn into_cards(self) -> Vec<Card> {
        self.0
    }
}

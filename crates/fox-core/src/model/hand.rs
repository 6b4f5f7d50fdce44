use crate::model::card::Card;
use crate::model::suit::Suit;
use std::vec::Vec;

/// Cards held by one player. Cards the observer cannot see are counted in
/// `hidden` so a redacted view keeps the same size as the real hand.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Hand {
    cards: Vec<Card>,
    hidden: usize,
}

impl Hand {
    pub fn new() -> Self {
        Self {
            cards: Vec::new(),
            hidden: 0,
        }
    }

    pub fn with_cards(cards: Vec<Card>) -> Self {
        let mut hand = Self { cards, hidden: 0 };
        hand.sort();
        hand
    }

    /// Adds a slot that is either a known card or a placeholder.
    pub fn add(&mut self, slot: Option<Card>) {
        match slot {
            Some(card) => {
                self.cards.push(card);
                self.sort();
            }
            None => self.hidden += 1,
        }
    }

    /// Removes a known card, or one placeholder when `slot` is `None`.
    pub fn remove(&mut self, slot: Option<Card>) -> bool {
        match slot {
            Some(card) => {
                if let Some(index) = self.cards.iter().position(|&c| c == card) {
                    self.cards.remove(index);
                    true
                } else if self.hidden > 0 {
                    // Revealed from a placeholder.
                    self.hidden -= 1;
                    true
                } else {
                    false
                }
            }
            None => {
                if self.hidden > 0 {
                    self.hidden -= 1;
                    true
                } else {
                    false
                }
            }
        }
    }

    /// Turns every known card into a placeholder.
    pub fn forget(&mut self) {
        self.hidden += self.cards.len();
        self.cards.clear();
    }

    pub fn contains(&self, card: Card) -> bool {
        self.cards.contains(&card)
    }

    pub fn has_suit(&self, suit: Suit) -> bool {
        self.cards.iter().any(|card| card.suit == suit)
    }

    pub fn highest_of(&self, suit: Suit) -> Option<Card> {
        self.cards
            .iter()
            .copied()
            .filter(|card| card.suit == suit)
            .max_by_key(|card| card.rank)
    }

    /// Total size, placeholders included.
    pub fn len(&self) -> usize {
        self.cards.len() + self.hidden
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn hidden(&self) -> usize {
        self.hidden
    }

    pub fn is_fully_known(&self) -> bool {
        self.hidden == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = &Card> {
        self.cards.iter()
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    fn sort(&mut self) {
        self.cards
            .sort_by(|a, b| a.suit.cmp(&b.suit).then(a.rank.cmp(&b.rank)));
    }
}

#[cfg(test)]
mod tests {
    use super::Hand;
    use crate::model::card::Card;
    use crate::model::rank::Rank;
    use crate::model::suit::Suit;

    #[test]
    fn add_and_remove_cards() {
        let mut hand = Hand::new();
        let card = Card::new(Rank::Three, Suit::Clubs);
        hand.add(Some(card));
        assert!(hand.contains(card));
        assert!(hand.remove(Some(card)));
        assert!(!hand.contains(card));
        assert!(!hand.remove(Some(card)));
    }

    #[test]
    fn cards_are_sorted_by_suit_then_rank() {
        let mut hand = Hand::new();
        hand.add(Some(Card::new(Rank::Eleven, Suit::Clubs)));
        hand.add(Some(Card::new(Rank::Two, Suit::Spades)));
        hand.add(Some(Card::new(Rank::One, Suit::Spades)));
        let ordered: Vec<_> = hand.iter().copied().collect();
        assert_eq!(ordered[0], Card::new(Rank::One, Suit::Spades));
        assert_eq!(ordered[1], Card::new(Rank::Two, Suit::Spades));
        assert_eq!(ordered[2], Card::new(Rank::Eleven, Suit::Clubs));
    }

    #[test]
    fn placeholders_count_towards_length() {
        let mut hand = Hand::with_cards(vec![Card::new(Rank::Four, Suit::Hearts)]);
        hand.add(None);
        hand.add(None);
        assert_eq!(hand.len(), 3);
        assert_eq!(hand.hidden(), 2);

        // A card revealed from a placeholder consumes the placeholder.
        assert!(hand.remove(Some(Card::new(Rank::Nine, Suit::Clubs))));
        assert!(hand.remove(None));
        assert_eq!(hand.len(), 1);
        assert!(hand.is_fully_known());
        assert!(!hand.remove(None));
    }

    #[test]
    fn forget_masks_known_cards() {
        let mut hand = Hand::with_cards(vec![
            Card::new(Rank::Four, Suit::Hearts),
            Card::new(Rank::Five, Suit::Spades),
        ]);
        hand.forget();
        assert_eq!(hand.len(), 2);
        assert!(hand.cards().is_empty());
    }

    #[test]
    fn highest_of_suit() {
        let hand = Hand::with_cards(vec![
            Card::new(Rank::Three, Suit::Hearts),
            Card::new(Rank::Eight, Suit::Hearts),
            Card::new(Rank::Ten, Suit::Clubs),
        ]);
        assert_eq!(
            hand.highest_of(Suit::Hearts),
            Some(Card::new(Rank::Eight, Suit::Hearts))
        );
        assert!(hand.has_suit(Suit::Clubs));
        assert!(!hand.has_suit(Suit::Spades));
        assert_eq!(hand.highest_of(Suit::Spades), None);
    }
}

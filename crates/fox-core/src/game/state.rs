use crate::model::card::{Card, DECK_SIZE};
use crate::model::hand::Hand;
use crate::model::player::Player;
use crate::model::score::FinalScore;
use crate::model::trick::{self, TrickOutcome};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use thiserror::Error;

/// Special effect waiting for its follow-up card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Pending {
    #[default]
    None,
    /// A 3 was played; the player holds the former trump and names a new one.
    TrumpTrade,
    /// A 5 was played; the player drew and discards one card face down.
    DrawDiscard,
}

impl Pending {
    pub const fn is_none(self) -> bool {
        matches!(self, Pending::None)
    }
}

/// Part a replayed play had in the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepRole {
    Lead,
    Response,
    Discard,
    NewTrump,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Step {
    pub player: Player,
    pub card: Option<Card>,
    pub role: StepRole,
    /// Effect this play opened, if any.
    pub opened: Pending,
}

/// Broken deck invariant. Only reachable through a defect or a forged record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConservationViolation {
    #[error("card {card} appears {count} times")]
    Duplicate { card: Card, count: u8 },
    #[error("card {0} is missing from the game")]
    Missing(Card),
    #[error("{player} does not hold {card}")]
    NotHeld { player: Player, card: Card },
    #[error("{player} has no card left to play")]
    EmptyHand { player: Player },
    #[error("hidden card played face up by {0}")]
    HiddenCard(Player),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedState {
    pub(crate) trick: [Option<Card>; 2],
    pub(crate) hands: [Hand; 2],
    pub(crate) discards: [Vec<Card>; 2],
    pub(crate) private_discards: [Vec<Option<Card>>; 2],
    pub(crate) leader: Player,
    pub(crate) current: Player,
    pub(crate) trump: Option<Card>,
    pub(crate) draw_pile: Vec<Option<Card>>,
    pub(crate) pending: Pending,
    pub(crate) score: Option<FinalScore>,
    pub(crate) initial_trump: Card,
    pub(crate) steps: Vec<Step>,
}

impl DerivedState {
    pub(crate) fn from_deal(
        first_player: Player,
        hands: &[Vec<Option<Card>>; 2],
        trump: Card,
        draw_pile: &[Option<Card>],
    ) -> Self {
        let build = |slots: &Vec<Option<Card>>| {
            let mut hand = Hand::new();
            for slot in slots {
                hand.add(*slot);
            }
            hand
        };
        Self {
            trick: [None, None],
            hands: [build(&hands[0]), build(&hands[1])],
            discards: [Vec::new(), Vec::new()],
            private_discards: [Vec::new(), Vec::new()],
            leader: first_player,
            current: first_player,
            trump: Some(trump),
            draw_pile: draw_pile.to_vec(),
            pending: Pending::None,
            score: None,
            initial_trump: trump,
            steps: Vec::new(),
        }
    }

    /// Applies one play. `None` is a face-down card the observer cannot see.
    pub fn advance(
        &mut self,
        player: Player,
        card: Option<Card>,
    ) -> Result<(), ConservationViolation> {
        let seat = player.index();
        match self.pending {
            Pending::DrawDiscard => {
                self.take_from_hand(player, card)?;
                self.private_discards[seat].push(card);
                self.pending = Pending::None;
                self.record(player, card, StepRole::Discard, Pending::None);
                self.current = player.opponent();
            }
            Pending::TrumpTrade => {
                let card = card.ok_or(ConservationViolation::HiddenCard(player))?;
                self.take_from_hand(player, Some(card))?;
                self.trump = Some(card);
                self.pending = Pending::None;
                self.record(player, Some(card), StepRole::NewTrump, Pending::None);
                self.current = player.opponent();
            }
            Pending::None => {
                let card = card.ok_or(ConservationViolation::HiddenCard(player))?;
                self.take_from_hand(player, Some(card))?;
                let role = if self.trick[player.opponent().index()].is_some() {
                    StepRole::Response
                } else {
                    StepRole::Lead
                };
                self.trick[seat] = Some(card);

                let holds_more = !self.hands[seat].is_empty();
                if holds_more && card.rank.draws_and_discards() && !self.draw_pile.is_empty() {
                    let drawn = self.draw_pile.remove(0);
                    self.hands[seat].add(drawn);
                    self.pending = Pending::DrawDiscard;
                    self.record(player, Some(card), role, Pending::DrawDiscard);
                    return Ok(());
                }
                if holds_more && card.rank.trades_trump() {
                    if let Some(old) = self.trump.take() {
                        self.hands[seat].add(Some(old));
                        self.pending = Pending::TrumpTrade;
                        self.record(player, Some(card), role, Pending::TrumpTrade);
                        return Ok(());
                    }
                }
                self.record(player, Some(card), role, Pending::None);
                self.current = player.opponent();
            }
        }
        self.complete_trick();
        Ok(())
    }

    fn take_from_hand(
        &mut self,
        player: Player,
        card: Option<Card>,
    ) -> Result<(), ConservationViolation> {
        let hand = &mut self.hands[player.index()];
        if hand.is_empty() {
            return Err(ConservationViolation::EmptyHand { player });
        }
        if card.is_none() {
            // Any known card may be the one that went face down.
            hand.forget();
        }
        if hand.remove(card) {
            return Ok(());
        }
        match card {
            Some(card) => Err(ConservationViolation::NotHeld { player, card }),
            None => Err(ConservationViolation::EmptyHand { player }),
        }
    }

    fn record(&mut self, player: Player, card: Option<Card>, role: StepRole, opened: Pending) {
        self.steps.push(Step {
            player,
            card,
            role,
            opened,
        });
    }

    fn complete_trick(&mut self) {
        let [Some(first), Some(second)] = self.trick else {
            return;
        };
        let TrickOutcome {
            winner,
            next_leader,
        } = trick::resolve(self.leader, [first, second], self.trump.map(|c| c.suit));
        self.discards[winner.index()].extend([first, second]);
        self.trick = [None, None];
        self.leader = next_leader;
        self.current = next_leader;
        if self.hands.iter().all(Hand::is_empty) {
            self.score = Some(FinalScore::from_discards(&self.discards));
        }
    }

    pub fn trick(&self) -> &[Option<Card>; 2] {
        &self.trick
    }

    /// Card the other player opened the current trick with.
    pub fn lead_card(&self, responder: Player) -> Option<Card> {
        if self.trick[responder.index()].is_some() {
            return None;
        }
        self.trick[responder.opponent().index()]
    }

    pub fn hand(&self, player: Player) -> &Hand {
        &self.hands[player.index()]
    }

    pub fn discards(&self, player: Player) -> &[Card] {
        &self.discards[player.index()]
    }

    pub fn private_discards(&self, player: Player) -> &[Option<Card>] {
        &self.private_discards[player.index()]
    }

    pub fn leader(&self) -> Player {
        self.leader
    }

    pub fn current_player(&self) -> Player {
        self.current
    }

    pub fn trump(&self) -> Option<Card> {
        self.trump
    }

    pub fn initial_trump(&self) -> Card {
        self.initial_trump
    }

    pub fn draw_pile(&self) -> &[Option<Card>] {
        &self.draw_pile
    }

    pub fn pending(&self) -> Pending {
        self.pending
    }

    pub fn score(&self) -> Option<&FinalScore> {
        self.score.as_ref()
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn tricks_played(&self) -> usize {
        (self.discards[0].len() + self.discards[1].len()) / 2
    }

    pub fn is_over(&self) -> bool {
        self.pending.is_none() && self.hands.iter().all(Hand::is_empty)
    }

    /// True when no placeholder remains anywhere in the state.
    pub fn is_fully_known(&self) -> bool {
        self.hands.iter().all(Hand::is_fully_known)
            && self
                .private_discards
                .iter()
                .all(|pile| pile.iter().all(Option::is_some))
            && self.draw_pile.iter().all(Option::is_some)
    }

    /// Every known card in the state, wherever it sits.
    pub fn visible_cards(&self) -> impl Iterator<Item = Card> + '_ {
        self.hands
            .iter()
            .flat_map(|hand| hand.iter().copied())
            .chain(self.discards.iter().flatten().copied())
            .chain(self.private_discards.iter().flatten().flatten().copied())
            .chain(self.draw_pile.iter().flatten().copied())
            .chain(self.trump)
            .chain(self.trick.iter().flatten().copied())
    }

    /// Checks that the 33 cards each sit in exactly one place. States with
    /// placeholders only check for duplicates.
    pub fn check_conservation(&self) -> Result<(), ConservationViolation> {
        let mut counts = [0u8; DECK_SIZE];
        for card in self.visible_cards() {
            let slot = &mut counts[card.to_id() as usize];
            *slot += 1;
            if *slot > 1 {
                return Err(ConservationViolation::Duplicate { card, count: *slot });
            }
        }
        if !self.is_fully_known() {
            return Ok(());
        }
        for (id, count) in counts.iter().enumerate() {
            if *count == 0 {
                if let Some(card) = Card::from_id(id as u8) {
                    return Err(ConservationViolation::Missing(card));
                }
            }
        }
        Ok(())
    }

    /// Console view of the state from one player's seat.
    pub fn render_for(&self, player: Player) -> String {
        let mut out = String::new();
        let slot = |card: Option<Card>| card.map_or_else(|| "??".to_string(), |c| c.to_string());
        let _ = writeln!(
            out,
            "trump {} | to play {} | leader {} | pending {:?}",
            slot(self.trump),
            self.current,
            self.leader,
            self.pending
        );
        let opponent = player.opponent();
        let _ = writeln!(
            out,
            "{opponent}: {} cards, {} tricks",
            self.hands[opponent.index()].len(),
            self.discards[opponent.index()].len() / 2
        );
        let _ = writeln!(
            out,
            "trick: {} / {}",
            slot(self.trick[0]),
            slot(self.trick[1])
        );
        let hand: Vec<String> = self.hands[player.index()]
            .iter()
            .map(ToString::to_string)
            .collect();
        let _ = writeln!(
            out,
            "{player}: [{}], {} tricks",
            hand.join(" "),
            self.discards[player.index()].len() / 2
        );
        if let Some(score) = &self.score {
            let _ = writeln!(
                out,
                "final score {} - {}",
                score.points(Player::Zero),
                score.points(Player::One)
            );
        }
        out
    }
}

use std::cmp::Reverse;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::card::{Card, total_points};
use crate::error::InvalidAction;
use crate::meld::{can_extend, validate_phase};
use crate::phase::{FINAL_PHASE, FINISHED_PHASE, FIRST_PHASE, Phase, phase};

/// Per-player state. Only `current_phase` and `score` survive between rounds.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    name: String,
    hand: Vec<Card>,
    current_phase: u8,
    completed_phase_this_round: bool,
    completed_phase_cards: Vec<Card>,
    score: u32,
}

impl Player {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            hand: Vec::new(),
            current_phase: FIRST_PHASE,
            completed_phase_this_round: false,
            completed_phase_cards: Vec::new(),
            score: 0,
        }
    }

    pub(crate) fn restore(
        name: String,
        hand: Vec<Card>,
        current_phase: u8,
        completed_phase_this_round: bool,
        completed_phase_cards: Vec<Card>,
        score: u32,
    ) -> Self {
        Self {
            name,
            hand,
            current_phase,
            completed_phase_this_round,
            completed_phase_cards,
            score,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn hand(&self) -> &[Card] {
        &self.hand
    }

    pub fn hand_size(&self) -> usize {
        self.hand.len()
    }

    pub fn hand_points(&self) -> u32 {
        total_points(&self.hand)
    }

    pub fn current_phase(&self) -> u8 {
        self.current_phase
    }

    /// Catalog entry for the phase being attempted; `None` once every phase is done.
    pub fn phase(&self) -> Option<&'static Phase> {
        phase(self.current_phase)
    }

    pub fn has_completed_phase(&self) -> bool {
        self.completed_phase_this_round
    }

    pub fn completed_phase_cards(&self) -> &[Card] {
        &self.completed_phase_cards
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn is_finished_with_all_phases(&self) -> bool {
        self.current_phase > FINAL_PHASE
    }

    pub fn holds(&self, card: &Card) -> bool {
        self.hand.contains(card)
    }

    pub(crate) fn add_card(&mut self, card: Card) {
        self.hand.push(card);
    }

    /// Removes exactly one instance of `card`.
    pub(crate) fn remove_card(&mut self, card: &Card) -> Result<Card, InvalidAction> {
        let index = self
            .hand
            .iter()
            .position(|held| held == card)
            .ok_or(InvalidAction::CardNotInHand(*card))?;
        Ok(self.hand.remove(index))
    }

    /// Hand left over after removing one instance per entry of `cards`.
    fn hand_without(&self, cards: &[Card]) -> Result<Vec<Card>, InvalidAction> {
        let mut remaining = self.hand.clone();
        for card in cards {
            let index = remaining
                .iter()
                .position(|held| held == card)
                .ok_or(InvalidAction::CardNotInHand(*card))?;
            remaining.remove(index);
        }
        Ok(remaining)
    }

    /// Checks a phase attempt without touching the hand.
    pub fn can_complete_phase(&self, cards: &[Card]) -> Result<(), InvalidAction> {
        if self.completed_phase_this_round {
            return Err(InvalidAction::PhaseAlreadyCompleted);
        }
        let current = self.phase().ok_or(InvalidAction::PhaseAlreadyCompleted)?;
        let remaining = self.hand_without(cards)?;
        if !validate_phase(cards, current) {
            return Err(InvalidAction::InvalidMeld {
                phase: current.number,
            });
        }
        if remaining.is_empty() {
            return Err(InvalidAction::MustKeepCardToDiscard);
        }
        Ok(())
    }

    /// Lays the phase down: the cards leave the hand and become the laid meld.
    pub(crate) fn complete_phase(&mut self, cards: &[Card]) -> Result<(), InvalidAction> {
        self.can_complete_phase(cards)?;
        self.hand = self.hand_without(cards)?;
        self.completed_phase_cards = cards.to_vec();
        self.completed_phase_this_round = true;
        Ok(())
    }

    /// Whether `card` fits this player's laid phase.
    pub fn accepts_hit(&self, card: &Card) -> bool {
        if !self.completed_phase_this_round {
            return false;
        }
        self.phase()
            .is_some_and(|current| can_extend(card, &self.completed_phase_cards, current))
    }

    pub(crate) fn receive_hit(&mut self, card: Card) {
        self.completed_phase_cards.push(card);
    }

    /// Moves to the next phase if this round's phase was laid down.
    pub(crate) fn advance_phase(&mut self) -> bool {
        if self.completed_phase_this_round && self.current_phase < FINISHED_PHASE {
            self.current_phase += 1;
            return true;
        }
        false
    }

    pub(crate) fn add_score(&mut self, points: u32) {
        self.score += points;
    }

    pub(crate) fn reset_for_new_round(&mut self) {
        self.hand.clear();
        self.completed_phase_this_round = false;
        self.completed_phase_cards.clear();
    }

    /// Display order for the hand, grouped to suit the current phase.
    ///
    /// Purely cosmetic: naturals first, then Wilds, then Skips.
    pub fn sorted_hand(&self) -> Vec<Card> {
        let mut naturals: Vec<Card> =
            self.hand.iter().copied().filter(|c| c.rank().is_some()).collect();
        let mut wilds: Vec<Card> = self.hand.iter().copied().filter(Card::is_wild).collect();
        let mut skips: Vec<Card> = self.hand.iter().copied().filter(Card::is_skip).collect();
        wilds.sort_by_key(Card::color);
        skips.sort_by_key(Card::color);

        match self.phase() {
            Some(current) if current.is_single_run() => {
                naturals.sort_by_key(|c| (c.rank(), c.color()));
            }
            Some(current) if current.is_color() => {
                let counts = tally(&naturals, |c| c.color());
                naturals.sort_by_key(|c| (Reverse(counts[&c.color()]), c.color(), c.rank()));
            }
            Some(_) => {
                let counts = tally(&naturals, |c| c.rank());
                naturals.sort_by_key(|c| (Reverse(counts[&c.rank()]), c.rank(), c.color()));
            }
            None => naturals.sort_by_key(|c| (c.rank(), c.color())),
        }

        naturals.extend(wilds);
        naturals.extend(skips);
        naturals
    }
}

fn tally<K: Ord>(cards: &[Card], key: impl Fn(&Card) -> K) -> BTreeMap<K, usize> {
    let mut counts = BTreeMap::new();
    for card in cards {
        *counts.entry(key(card)).or_default() += 1;
    }
    counts
}

use serde::{Deserialize, Serialize};

use crate::card::Card;

/// Zero-based index of a player within the game.
pub type PlayerId = usize;

/// Pile a card is drawn from at the start of a turn.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum DrawSource {
    /// Face-down deck (replenished from the discard pile when empty).
    Deck,
    /// Top of the discard pile, unless it is a Skip.
    Discard,
}

/// Action available to the current player during their turn.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum Action {
    /// Draw one card.
    Draw(DrawSource),
    /// Lay down the current phase with exactly these cards from the hand.
    CompletePhase(Vec<Card>),
    /// Add a single card to a laid phase (own or another player's).
    Hit { card: Card, target: PlayerId },
    /// Decline the remaining optional steps and go straight to discarding.
    Pass,
    /// Discard one card, ending the turn.
    Discard(Card),
}

impl Action {
    /// True for the action that ends a turn.
    pub fn ends_turn(&self) -> bool {
        matches!(self, Action::Discard(_))
    }
}

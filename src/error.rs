use thiserror::Error;

use crate::action::PlayerId;
use crate::card::Card;
use crate::state::TurnPhase;

/// Errors that can occur when manipulating the game state.
#[derive(Debug, Error)]
pub enum GameError {
    #[error("a game needs between 2 and 6 players, got {0}")]
    InvalidPlayerCount(usize),
    #[error("player name {0:?} is empty or used more than once")]
    DuplicatePlayerName(String),
    #[error("player index {0} is out of range")]
    InvalidPlayer(PlayerId),
    #[error("not the specified player's turn")]
    NotPlayersTurn,
    #[error("action not allowed while {actual:?}")]
    WrongTurnPhase { actual: TurnPhase },
    #[error("invalid action: {0}")]
    InvalidAction(#[from] InvalidAction),
    #[error("game is already over")]
    GameOver,
    #[error("round is over; start the next round first")]
    RoundOver,
    #[error("deck and discard pile are both exhausted")]
    PilesExhausted,
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(&'static str),
    #[error("invalid game record: {0}")]
    InvalidRecord(String),
    #[error("record encoding failed: {0}")]
    Encoding(String),
}

/// Rule violations. The game is left untouched when one is reported.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvalidAction {
    #[error("{0} is not in the player's hand")]
    CardNotInHand(Card),
    #[error("a Skip cannot be taken from the discard pile")]
    SkipNotDrawable,
    #[error("no card available in the selected pile")]
    NoCardAvailable,
    #[error("selected cards do not complete phase {phase}")]
    InvalidMeld { phase: u8 },
    #[error("phase already completed this round")]
    PhaseAlreadyCompleted,
    #[error("the phase attempt for this turn has already been used")]
    PhaseAttemptUsed,
    #[error("player must complete their phase before hitting")]
    PhaseNotCompleted,
    #[error("player {0} has not laid down a phase this round")]
    TargetPhaseNotCompleted(PlayerId),
    #[error("{0} does not fit the laid phase")]
    CannotHit(Card),
    #[error("at least one card must remain in hand to discard")]
    MustKeepCardToDiscard,
}

use serde::{Deserialize, Serialize};

use crate::action::PlayerId;
use crate::card::{Card, DECK_SIZE, HAND_SIZE, MAX_PLAYERS, MIN_PLAYERS};
use crate::error::GameError;

/// Global constants for a running game.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameSettings {
    pub num_players: usize,
    pub hand_size: usize,
}

impl GameSettings {
    pub fn new(num_players: usize) -> Result<Self, GameError> {
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&num_players) {
            return Err(GameError::InvalidPlayerCount(num_players));
        }
        Ok(Self {
            num_players,
            hand_size: HAND_SIZE,
        })
    }

    /// Every hand plus the starter discard must come out of one deck.
    pub fn check_hand_size(&self) -> Result<(), GameError> {
        if self.hand_size == 0 {
            return Err(GameError::InvalidConfiguration("hand size must be positive"));
        }
        if self.hand_size * self.num_players + 1 > DECK_SIZE {
            return Err(GameError::InvalidConfiguration("hand size too large for the deck"));
        }
        Ok(())
    }
}

/// Status of the entire game.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum GameStatus {
    Ongoing,
    Finished { winner: PlayerId },
}

/// Step of the current player's turn.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum TurnPhase {
    AwaitingDraw,
    AwaitingPhaseAttempt,
    AwaitingHits,
    AwaitingDiscard,
    /// Someone went out; the next round has not been dealt yet.
    RoundOver,
    GameOver,
}

impl TurnPhase {
    /// True once the player has drawn and may end the turn by discarding.
    pub fn may_discard(&self) -> bool {
        matches!(
            self,
            TurnPhase::AwaitingPhaseAttempt | TurnPhase::AwaitingHits | TurnPhase::AwaitingDiscard
        )
    }
}

/// Public portion of a player's state.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlayerPublicState {
    pub id: PlayerId,
    pub name: String,
    pub phase: u8,
    pub hand_size: usize,
    pub score: u32,
    pub completed_phase: bool,
    pub laid_cards: Vec<Card>,
    pub is_current: bool,
}

/// Snapshot of everything observable about a game.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameStateView {
    pub settings: GameSettings,
    pub round_number: u32,
    pub turn_phase: TurnPhase,
    pub status: GameStatus,
    pub current_player: PlayerId,
    pub players: Vec<PlayerPublicState>,
    pub discard_top: Option<Card>,
    pub discard_size: usize,
    pub deck_size: usize,
    pub game_over: bool,
    pub winner: Option<String>,
}

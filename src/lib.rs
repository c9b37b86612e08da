//! Phase 10 rules engine: meld validation and the round/turn state machine.

pub mod action;
pub mod card;
pub mod error;
pub mod game;
pub mod meld;
pub mod phase;
pub mod pile;
pub mod player;
pub mod record;
pub mod score;
pub mod seed;
pub mod state;
pub mod visualize;

pub use crate::action::{Action, DrawSource, PlayerId};
pub use crate::card::{Card, Color};
pub use crate::error::{GameError, InvalidAction};
pub use crate::game::{Game, GameBuilder, new_game};
pub use crate::meld::{
    can_extend, is_valid_color_requirement, is_valid_run, is_valid_set, partition_phase,
    validate_phase,
};
pub use crate::phase::{MeldKind, PHASES, Phase, PhaseRequirement, phase};
pub use crate::pile::{Deck, DiscardPile};
pub use crate::player::Player;
pub use crate::record::{GameRecord, PlayerRecord};
pub use crate::score::RoundSummary;
pub use crate::state::{GameSettings, GameStateView, GameStatus, PlayerPublicState, TurnPhase};
pub use crate::visualize::{VisualOptions, describe_action, render_state, render_state_with_options};

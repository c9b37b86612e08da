//! Round scoring.
//!
//! The player who goes out collects the penalty points left in every other
//! hand: Wild 25, Skip 15, ranks 10-12 score 10 and ranks 1-9 score 5.

use serde::{Deserialize, Serialize};

use crate::action::PlayerId;
use crate::player::Player;

/// Outcome of a finished round.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundSummary {
    pub round_number: u32,
    pub winner: PlayerId,
    pub points_awarded: u32,
    /// Players whose phase advanced at the end of the round.
    pub advanced: Vec<PlayerId>,
}

/// Points the round winner collects from everyone else's hand.
pub fn round_points(players: &[Player], winner: PlayerId) -> u32 {
    players
        .iter()
        .enumerate()
        .filter(|(id, _)| *id != winner)
        .map(|(_, player)| player.hand_points())
        .sum()
}

/// Picks the game winner among players who finished every phase.
///
/// A lone finisher wins outright; otherwise the highest score wins and a
/// tie goes to the earliest seat.
pub fn pick_game_winner(players: &[Player]) -> Option<PlayerId> {
    players
        .iter()
        .enumerate()
        .filter(|(_, player)| player.is_finished_with_all_phases())
        .fold(None, |best: Option<(PlayerId, u32)>, (id, player)| match best {
            Some((_, score)) if score >= player.score() => best,
            _ => Some((id, player.score())),
        })
        .map(|(id, _)| id)
}

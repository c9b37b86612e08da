//! Serialization boundary.
//!
//! A [`GameRecord`] holds everything needed to resume a game, including the
//! seed and shuffle counter so that later reshuffles replay identically.

use std::collections::HashMap;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::action::PlayerId;
use crate::card::{Card, full_deck};
use crate::error::GameError;
use crate::game::{Game, ensure_unique_names};
use crate::phase::{FINISHED_PHASE, FIRST_PHASE};
use crate::pile::{Deck, DiscardPile};
use crate::player::Player;
use crate::score::RoundSummary;
use crate::state::{GameSettings, TurnPhase};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub name: String,
    pub hand: Vec<Card>,
    pub current_phase: u8,
    pub completed_phase_this_round: bool,
    pub completed_phase_cards: Vec<Card>,
    pub score: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRecord {
    pub settings: GameSettings,
    pub seed: u64,
    pub shuffles: u64,
    pub players: Vec<PlayerRecord>,
    /// Deck contents, top card last.
    pub deck: Vec<Card>,
    /// Discard contents, top card last.
    pub discard: Vec<Card>,
    pub round_number: u32,
    pub current_player: PlayerId,
    pub turn_phase: TurnPhase,
    /// The current player's phase attempt this turn was rejected.
    pub phase_attempted: bool,
    pub game_over: bool,
    pub winner: Option<String>,
    pub last_round: Option<RoundSummary>,
}

impl Game {
    pub fn to_record(&self) -> GameRecord {
        GameRecord {
            settings: self.settings,
            seed: self.seed,
            shuffles: self.shuffles,
            players: self
                .players
                .iter()
                .map(|player| PlayerRecord {
                    name: player.name().to_string(),
                    hand: player.hand().to_vec(),
                    current_phase: player.current_phase(),
                    completed_phase_this_round: player.has_completed_phase(),
                    completed_phase_cards: player.completed_phase_cards().to_vec(),
                    score: player.score(),
                })
                .collect(),
            deck: self.deck.cards().to_vec(),
            discard: self.discard.cards().to_vec(),
            round_number: self.round_number,
            current_player: self.current_player,
            turn_phase: self.turn_phase,
            phase_attempted: self.phase_attempted,
            game_over: self.winner.is_some(),
            winner: self.winner.map(|id| self.players[id].name().to_string()),
            last_round: self.last_round.clone(),
        }
    }

    /// Rebuilds a game from a record, rejecting records no game could reach.
    pub fn from_record(record: GameRecord) -> Result<Self, GameError> {
        validate(&record).inspect_err(|err| warn!("rejecting game record: {err}"))?;
        let winner = match &record.winner {
            Some(name) => record.players.iter().position(|p| &p.name == name),
            None => None,
        };
        let players = record
            .players
            .into_iter()
            .map(|p| {
                Player::restore(
                    p.name,
                    p.hand,
                    p.current_phase,
                    p.completed_phase_this_round,
                    p.completed_phase_cards,
                    p.score,
                )
            })
            .collect();
        Ok(Game {
            settings: record.settings,
            seed: record.seed,
            shuffles: record.shuffles,
            players,
            deck: Deck::from_cards(record.deck),
            discard: DiscardPile::from_cards(record.discard),
            current_player: record.current_player,
            round_number: record.round_number,
            turn_phase: record.turn_phase,
            phase_attempted: record.phase_attempted,
            winner,
            last_round: record.last_round,
        })
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, GameError> {
        bincode::serde::encode_to_vec(self.to_record(), bincode::config::standard())
            .map_err(|err| GameError::Encoding(err.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, GameError> {
        let (record, _): (GameRecord, usize) =
            bincode::serde::decode_from_slice(bytes, bincode::config::standard())
                .map_err(|err| GameError::Encoding(err.to_string()))?;
        Self::from_record(record)
    }
}

fn validate(record: &GameRecord) -> Result<(), GameError> {
    let invalid =
        |msg: &str| -> Result<(), GameError> { Err(GameError::InvalidRecord(msg.to_string())) };
    let count = record.players.len();
    if GameSettings::new(count).is_err() || record.settings.num_players != count {
        return invalid("player count does not match settings");
    }
    if let Err(err) = record.settings.check_hand_size() {
        return invalid(&err.to_string());
    }
    ensure_unique_names(record.players.iter().map(|p| p.name.as_str()))?;
    if record.current_player >= count {
        return invalid("current player out of range");
    }
    if record.round_number == 0 {
        return invalid("round number starts at 1");
    }
    for player in &record.players {
        if !(FIRST_PHASE..=FINISHED_PHASE).contains(&player.current_phase) {
            return invalid("phase out of range");
        }
        if !player.completed_phase_this_round && !player.completed_phase_cards.is_empty() {
            return invalid("laid cards without a completed phase");
        }
    }
    let mut copies: HashMap<Card, usize> = HashMap::new();
    for card in full_deck() {
        *copies.entry(card).or_default() += 1;
    }
    let in_play = record
        .players
        .iter()
        .flat_map(|p| p.hand.iter().chain(&p.completed_phase_cards))
        .chain(&record.deck)
        .chain(&record.discard);
    for card in in_play {
        match copies.get_mut(card) {
            Some(left) if *left > 0 => *left -= 1,
            _ => return invalid(&format!("more copies of {card:?} than a deck holds")),
        }
    }
    let winner_known = match &record.winner {
        Some(name) => record.players.iter().any(|p| &p.name == name),
        None => true,
    };
    if !winner_known {
        return invalid("winner is not a player");
    }
    if record.phase_attempted
        && !matches!(
            record.turn_phase,
            TurnPhase::AwaitingPhaseAttempt | TurnPhase::AwaitingDiscard
        )
    {
        return invalid("phase attempt recorded outside a turn");
    }
    let finished = record.turn_phase == TurnPhase::GameOver;
    if record.game_over != record.winner.is_some() || record.game_over != finished {
        return invalid("game-over flag, winner and turn phase disagree");
    }
    if let Some(summary) = &record.last_round {
        if summary.winner >= count {
            return invalid("round summary winner out of range");
        }
    }
    Ok(())
}

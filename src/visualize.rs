use std::fmt::Write;

use crate::action::{Action, DrawSource};
use crate::card::Card;
use crate::phase::phase;
use crate::state::{GameStateView, GameStatus};

/// Customize state rendering for CLI visualization.
#[derive(Clone, Copy, Debug)]
pub struct VisualOptions {
    pub show_laid_cards: bool,
    pub show_phase_descriptions: bool,
}

impl Default for VisualOptions {
    fn default() -> Self {
        Self {
            show_laid_cards: true,
            show_phase_descriptions: true,
        }
    }
}

/// Renders the snapshot plus `hand`, the current player's cards in display order.
pub fn render_state(state: &GameStateView, hand: &[Card]) -> String {
    render_state_with_options(state, hand, VisualOptions::default())
}

pub fn render_state_with_options(
    state: &GameStateView,
    hand: &[Card],
    options: VisualOptions,
) -> String {
    let mut out = String::new();
    let status = match (&state.status, &state.winner) {
        (GameStatus::Finished { .. }, Some(name)) => format!("Finished (winner: {name})"),
        (GameStatus::Finished { winner }, None) => format!("Finished (winner: Player {winner})"),
        (GameStatus::Ongoing, _) => String::from("Ongoing"),
    };
    let _ = writeln!(out, "Round {}  |  {status}", state.round_number);
    let _ = writeln!(out, "Turn step: {:?}", state.turn_phase);
    let discard_top = state
        .discard_top
        .map(|card| card.to_string())
        .unwrap_or_else(|| String::from("--"));
    let _ = writeln!(
        out,
        "Deck: {}  |  Discard: {} (top: {discard_top})",
        state.deck_size, state.discard_size
    );
    let _ = writeln!(out, "Players:");
    for player in &state.players {
        let current_tag = if player.is_current { " <- current" } else { "" };
        let phase_text = match phase(player.phase) {
            Some(entry) if options.show_phase_descriptions => format!("{entry}"),
            Some(entry) => format!("Phase {}", entry.number),
            None => String::from("all phases done"),
        };
        let _ = writeln!(
            out,
            "  {} - {phase_text}, {} cards, {} points{current_tag}",
            player.name, player.hand_size, player.score
        );
        if options.show_laid_cards && player.completed_phase {
            let _ = writeln!(out, "    Laid: {}", join_cards(&player.laid_cards));
        }
    }
    if hand.is_empty() {
        let _ = writeln!(out, "Hand: (empty)");
    } else {
        let entries: Vec<String> = hand
            .iter()
            .enumerate()
            .map(|(idx, card)| format!("{}:{card}", idx + 1))
            .collect();
        let _ = writeln!(out, "Hand: {}", entries.join("  "));
    }
    out
}

pub fn describe_action(state: &GameStateView, action: &Action) -> String {
    let name_of = |id: usize| {
        state
            .players
            .get(id)
            .map(|player| player.name.clone())
            .unwrap_or_else(|| format!("Player {id}"))
    };
    match action {
        Action::Draw(DrawSource::Deck) => String::from("Draw from the deck"),
        Action::Draw(DrawSource::Discard) => match state.discard_top {
            Some(card) => format!("Take {card} from the discard pile"),
            None => String::from("Take from the discard pile"),
        },
        Action::CompletePhase(cards) => format!("Lay down phase with {}", join_cards(cards)),
        Action::Hit { card, target } if *target == state.current_player => {
            format!("Hit {card} on own phase")
        }
        Action::Hit { card, target } => format!("Hit {card} on {}'s phase", name_of(*target)),
        Action::Pass => String::from("Pass"),
        Action::Discard(card) => format!("Discard {card}"),
    }
}

fn join_cards(cards: &[Card]) -> String {
    cards
        .iter()
        .map(Card::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

use std::error::Error;
use std::fs;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use phaseten::{
    Action, Game, GameError, TurnPhase, VisualOptions, describe_action, render_state_with_options,
};

const DEFAULT_SEED: u64 = 0xDEC0_1DED_5EED_F00D;

/// Plays seeded games with randomly chosen legal moves, exercising the rules engine.
#[derive(Parser, Debug)]
#[command(name = "simulate", about = "Play seeded Phase 10 games with random legal moves.")]
struct Args {
    /// Comma-separated player names (overrides --players)
    #[arg(long, value_delimiter = ',')]
    names: Option<Vec<String>>,

    /// Number of players when no names are given
    #[arg(short = 'p', long, default_value_t = 3)]
    players: usize,

    /// Base seed; game `i` uses `seed + i`
    #[arg(short = 's', long, default_value_t = DEFAULT_SEED)]
    seed: u64,

    /// Number of games to play
    #[arg(short = 'g', long, default_value_t = 1)]
    games: usize,

    /// Abandon a game after this many actions
    #[arg(long, default_value_t = 20_000)]
    max_turns: usize,

    /// Print the game state and every chosen action
    #[arg(long)]
    visualize: bool,

    /// With --visualize, omit laid cards and phase descriptions
    #[arg(long)]
    compact: bool,

    /// Write the last game's final record (bincode) to this path
    #[arg(long)]
    save: Option<PathBuf>,
}

fn main() {
    env_logger::init();
    if let Err(err) = run(Args::parse()) {
        eprintln!("Error: {err}");
        process::exit(1);
    }
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let names = args.names.clone().unwrap_or_else(|| {
        (1..=args.players)
            .map(|seat| format!("Player {seat}"))
            .collect()
    });
    let mut last_game = None;
    let mut wins = vec![0usize; names.len()];
    let mut abandoned = 0usize;

    for index in 0..args.games {
        let seed = args.seed.wrapping_add(index as u64);
        let mut game = Game::builder(names.clone()).with_seed(seed).build()?;
        let mut rng = StdRng::seed_from_u64(seed ^ 0x9E37_79B9);
        match play(&mut game, &mut rng, &args)? {
            Some((winner, turns)) => {
                wins[winner] += 1;
                println!(
                    "game {index}: {} wins after {} rounds ({turns} turns) with {} points",
                    names[winner],
                    game.round_number(),
                    game.players()[winner].score()
                );
            }
            None => {
                abandoned += 1;
                println!("game {index}: abandoned after {} actions", args.max_turns);
            }
        }
        last_game = Some(game);
    }

    println!("\nSummary over {} games:", args.games);
    for (name, count) in names.iter().zip(&wins) {
        println!("  {name:<16} {count}");
    }
    if abandoned > 0 {
        println!("  abandoned        {abandoned}");
    }

    if let (Some(path), Some(game)) = (&args.save, &last_game) {
        fs::write(path, game.to_bytes()?)?;
        println!("saved final record to {}", path.display());
    }
    Ok(())
}

/// Plays until someone wins or the action limit is hit, returning the
/// winner and the number of completed turns.
fn play(
    game: &mut Game,
    rng: &mut StdRng,
    args: &Args,
) -> Result<Option<(usize, usize)>, GameError> {
    let options = VisualOptions {
        show_laid_cards: !args.compact,
        show_phase_descriptions: !args.compact,
    };
    let mut turns = 0;
    for _ in 0..args.max_turns {
        match game.turn_phase() {
            TurnPhase::GameOver => return Ok(game.winner().map(|winner| (winner, turns))),
            TurnPhase::RoundOver => {
                if let Some(summary) = game.last_round() {
                    log::info!("{summary:?}");
                }
                game.start_next_round()?;
                continue;
            }
            _ => {}
        }
        let current = game.current_player();
        let actions = game.legal_actions(current)?;
        let action = choose(&actions, rng).ok_or(GameError::InvalidConfiguration(
            "no legal actions available for current player",
        ))?;
        if args.visualize {
            let view = game.status_view();
            let hand = game.sorted_hand(current)?;
            println!("{}", render_state_with_options(&view, &hand, options));
            println!("Chosen action: {}\n", describe_action(&view, &action));
        }
        let ends_turn = action.ends_turn();
        game.apply_action(current, action)?;
        if ends_turn {
            turns += 1;
        }
    }
    Ok(game.winner().map(|winner| (winner, turns)))
}

/// Always lays down a phase when one is available, otherwise picks uniformly.
fn choose(actions: &[Action], rng: &mut StdRng) -> Option<Action> {
    actions
        .iter()
        .find(|action| matches!(action, Action::CompletePhase(_)))
        .or_else(|| actions.choose(rng))
        .cloned()
}

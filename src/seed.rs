//! Seed derivation for shuffles.
//!
//! Every shuffle in a game (the deal at the start of a round and any deck
//! replenishment) draws its RNG from the game seed plus a shuffle counter, so
//! a game restored from a record reshuffles exactly like the original.

use rand::SeedableRng;
use rand::rngs::StdRng;

/// Derive the seed for the `shuffle_index`-th shuffle of a game.
pub fn derive_shuffle_seed(game_seed: u64, shuffle_index: u64) -> u64 {
    game_seed
        .wrapping_add(shuffle_index.wrapping_mul(0x9E37_79B9_7F4A_7C15))
        .rotate_left(17)
        ^ 0x5EED
}

pub fn shuffle_rng(game_seed: u64, shuffle_index: u64) -> StdRng {
    StdRng::seed_from_u64(derive_shuffle_seed(game_seed, shuffle_index))
}

//! Call sequencer.

use crate::rng::GameRng;
use bingo_core::WordPool;
use std::collections::HashSet;

/// Pick a pool word that has not been called yet, uniformly at random.
///
/// Returns `None` once every pool word is in `call_history`. The history is
/// not modified; appending the word is the caller's job.
pub fn next_word<'a>(
    pool: &'a WordPool,
    call_history: &[String],
    rng: &mut GameRng,
) -> Option<&'a str> {
    let called: HashSet<&str> = call_history.iter().map(String::as_str).collect();
    let available: Vec<&'a str> = pool
        .words()
        .iter()
        .map(String::as_str)
        .filter(|word| !called.contains(word))
        .collect();

    rng.choose(&available).copied()
}

use async_trait::async_trait;
use bingo_core::{CompletionReason, Game};
use bingo_game::{Announcer, GameError, Result};
use rand::seq::SliceRandom;
use std::io::Write;

const GREETINGS: &[&str] = &[
    "Sup gamers!",
    "Hey team! Ready to put it all on red?",
    "Bingo time!",
    "New call alert!",
    "Let's play!",
];

/// Prints announcements to stdout in place of channel messages.
pub struct ConsoleAnnouncer;

fn emit(text: &str) -> Result<()> {
    let mut out = std::io::stdout().lock();
    writeln!(out, "{}", text)
        .and_then(|_| out.flush())
        .map_err(|e| GameError::announcement(format!("stdout: {}", e)))
}

fn greeting() -> &'static str {
    GREETINGS
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or("Bingo time!")
}

fn format_call(word: &str, previous_calls: &[String]) -> String {
    let previous = if previous_calls.is_empty() {
        "None yet".to_string()
    } else {
        previous_calls.join(", ")
    };
    format!(
        "{}\nYour bingo word is: {}\nPrevious calls: {}",
        greeting(),
        word,
        previous
    )
}

fn format_stop(game: &Game, stopped_by: Option<&str>) -> String {
    match (game.completion_reason, stopped_by) {
        (Some(CompletionReason::Superseded), _) => {
            "This game was replaced by a new one. Open your new card with: bingo card".to_string()
        }
        (Some(CompletionReason::PoolExhausted), _) => format!(
            "All {} words have been called. Game over, nobody claimed bingo.",
            game.word_pool.len()
        ),
        (_, Some(user)) => format!(
            "Game stopped by {}. Start a new game with: bingo start",
            user
        ),
        (_, None) => "Game stopped. Start a new game with: bingo start".to_string(),
    }
}

#[async_trait]
impl Announcer for ConsoleAnnouncer {
    async fn post_call(&self, channel: &str, word: &str, previous_calls: &[String]) -> Result<()> {
        emit(&format!("[#{}] {}", channel, format_call(word, previous_calls)))
    }

    async fn post_start(&self, game: &Game, first_word: &str) -> Result<()> {
        emit(&format!(
            "[#{}] Game started by {}! The first word is: {}\nOpen your card with: bingo card --player <name>",
            game.channel, game.started_by, first_word
        ))
    }

    async fn post_stop(&self, game: &Game, stopped_by: Option<&str>) -> Result<()> {
        emit(&format!("[#{}] {}", game.channel, format_stop(game, stopped_by)))
    }

    async fn post_winner(&self, channel: &str, winner: &str) -> Result<()> {
        emit(&format!("[#{}] GAME OVER! Your Bingo King is {}", channel, winner))
    }

    async fn post_ephemeral(&self, recipient: &str, message: &str) -> Result<()> {
        emit(&format!("(only visible to {}) {}", recipient, message))
    }
}

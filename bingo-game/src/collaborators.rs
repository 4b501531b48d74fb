//! Outbound seams: chat announcements and the periodic call trigger.
//!
//! Both are fire-and-forget from the game's point of view. The lifecycle
//! manager logs their failures and carries on.

use crate::Result;
use async_trait::async_trait;
use bingo_core::Game;

#[async_trait]
pub trait Announcer: Send + Sync {
    /// A new word was called. `previous_calls` excludes `word`.
    async fn post_call(&self, channel: &str, word: &str, previous_calls: &[String]) -> Result<()>;

    /// A game started; `first_word` is its opening call.
    async fn post_start(&self, game: &Game, first_word: &str) -> Result<()>;

    /// A game ended without a winner. `game.completion_reason` says why;
    /// `stopped_by` is set for manual stops.
    async fn post_stop(&self, game: &Game, stopped_by: Option<&str>) -> Result<()>;

    async fn post_winner(&self, channel: &str, winner: &str) -> Result<()>;

    /// Message only `recipient` sees.
    async fn post_ephemeral(&self, recipient: &str, message: &str) -> Result<()>;
}

/// Switch for the external timer that fires scheduled ticks.
#[async_trait]
pub trait CallScheduler: Send + Sync {
    async fn enable(&self) -> Result<()>;
    async fn disable(&self) -> Result<()>;
}

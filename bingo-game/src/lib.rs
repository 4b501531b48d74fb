//! Bingo game logic
//!
//! Deals cards, detects wins, calls words and runs the lifecycle of a single
//! chat-wide game against the storage contract from `bingo-core`.

pub mod caller;
pub mod card;
pub mod collaborators;
pub mod error;
pub mod manager;
pub mod outcome;
pub mod rng;
pub mod win;

pub use caller::next_word;
pub use card::generate_card;
pub use collaborators::{Announcer, CallScheduler};
pub use error::{GameError, Result};
pub use manager::{GameManager, StartRequest};
pub use outcome::{
    CardOutcome, CardView, CellState, ClaimOutcome, StampIgnored, StampOutcome, StopOutcome,
    TickOutcome,
};
pub use rng::GameRng;
pub use win::{has_bingo, winning_line, Line, WINNING_LINES};

//! Chat bingo core - data model, configuration and persistence
//!
//! Holds the game and card records, the error type shared by the workspace,
//! and the storage contract together with its SQLite and in-memory
//! implementations.

pub mod config;
pub mod error;
pub mod storage;
pub mod types;

pub use config::GameConfig;
pub use error::{BingoError, Result};
pub use storage::{BingoStore, MemoryStore, Storage};
pub use types::{
    position, Card, Completion, CompletionReason, Game, GameStatus, PlayerCard, PlayerId,
    StampedSet, WordPool, CELL_COUNT, FREE_POSITION, FREE_SPACE, GRID_SIZE, WORDS_PER_CARD,
};

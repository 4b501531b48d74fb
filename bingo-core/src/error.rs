use thiserror::Error;
use uuid::Uuid;

pub type Result<T> = std::result::Result<T, BingoError>;

#[derive(Error, Debug)]
pub enum BingoError {
    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Need at least {need} words. You provided {got}.")]
    NotEnoughWords { need: usize, got: usize },

    #[error("Invalid call frequency: {0}")]
    InvalidFrequency(String),

    #[error("Another game is already active: {0}")]
    ActiveGameExists(Uuid),

    #[error("Corrupt record: {0}")]
    CorruptRecord(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl BingoError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn invalid_frequency(msg: impl Into<String>) -> Self {
        Self::InvalidFrequency(msg.into())
    }

    pub fn corrupt(msg: impl Into<String>) -> Self {
        Self::CorruptRecord(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// True for errors caused by what the requester typed rather than by the system.
    pub fn is_user_input(&self) -> bool {
        matches!(
            self,
            BingoError::NotEnoughWords { .. } | BingoError::InvalidFrequency(_)
        )
    }
}

use thiserror::Error;

pub type Result<T> = std::result::Result<T, GameError>;

#[derive(Error, Debug)]
pub enum GameError {
    #[error("Bingo core error: {0}")]
    Core(#[from] bingo_core::BingoError),

    #[error("Announcement failed: {0}")]
    Announcement(String),

    #[error("Scheduler error: {0}")]
    Scheduler(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl GameError {
    pub fn announcement(msg: impl Into<String>) -> Self {
        Self::Announcement(msg.into())
    }

    pub fn scheduler(msg: impl Into<String>) -> Self {
        Self::Scheduler(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Errors the requester caused and can fix by resubmitting.
    pub fn is_user_input(&self) -> bool {
        matches!(self, GameError::Core(e) if e.is_user_input())
    }
}

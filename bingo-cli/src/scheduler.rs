use async_trait::async_trait;
use bingo_core::storage::SchedulerStore;
use bingo_core::Storage;
use bingo_game::{CallScheduler, GameError, Result};
use std::sync::Arc;

/// Rule name of the periodic caller in the scheduler table.
pub const CALLER_RULE: &str = "bingo-caller";

/// Scheduler switch persisted in the game database. `bingo run` polls it.
pub struct StoredScheduler {
    storage: Arc<Storage>,
    rule: String,
}

impl StoredScheduler {
    pub fn new(storage: Arc<Storage>) -> Self {
        Self {
            storage,
            rule: CALLER_RULE.to_string(),
        }
    }

    pub async fn is_enabled(&self) -> bingo_core::Result<bool> {
        SchedulerStore::new(&self.storage)
            .is_enabled(&self.rule)
            .await
    }

    async fn set_enabled(&self, enabled: bool) -> Result<()> {
        SchedulerStore::new(&self.storage)
            .set_enabled(&self.rule, enabled)
            .await
            .map_err(|e| GameError::scheduler(format!("Failed to update '{}': {}", self.rule, e)))
    }
}

#[async_trait]
impl CallScheduler for StoredScheduler {
    async fn enable(&self) -> Result<()> {
        self.set_enabled(true).await
    }

    async fn disable(&self) -> Result<()> {
        self.set_enabled(false).await
    }
}

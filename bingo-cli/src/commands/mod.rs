mod host;
mod player;

pub use host::{handle_host_command, HostCommands};
pub use player::{handle_player_command, PlayerCommands};

use crate::announcer::ConsoleAnnouncer;
use crate::config::CliConfig;
use crate::scheduler::StoredScheduler;
use bingo_core::Storage;
use bingo_game::GameManager;
use std::sync::Arc;

/// Everything a command needs, opened once per invocation.
pub struct App {
    pub config: CliConfig,
    pub scheduler: Arc<StoredScheduler>,
    pub manager: GameManager,
}

impl App {
    pub async fn open(config: CliConfig) -> anyhow::Result<Self> {
        tokio::fs::create_dir_all(&config.data_dir).await?;

        let storage = Arc::new(Storage::new(&config.database_path()).await?);
        let scheduler = Arc::new(StoredScheduler::new(storage.clone()));
        let manager = GameManager::new(
            storage,
            Arc::new(ConsoleAnnouncer),
            scheduler.clone(),
            config.game.clone(),
        )?;

        Ok(Self {
            config,
            scheduler,
            manager,
        })
    }
}

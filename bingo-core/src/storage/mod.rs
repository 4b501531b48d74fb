pub mod card_store;
pub mod game_store;
pub mod memory;
pub mod scheduler_store;

pub use card_store::CardStore;
pub use game_store::GameStore;
pub use memory::MemoryStore;
pub use scheduler_store::SchedulerStore;

use crate::error::Result;
use crate::types::{Card, Completion, Game, PlayerCard, StampedSet};
use async_trait::async_trait;
use rusqlite::Connection;
use std::path::Path;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Persistence contract the game lifecycle runs against.
///
/// `create_game`, `append_call` and `complete_game` must each be a single
/// atomic step: they are the only thing standing between concurrent triggers
/// and a lost call, a second winner or a channel left without its game.
#[async_trait]
pub trait BingoStore: Send + Sync {
    /// Persist a new active game together with any calls already in its history.
    ///
    /// With `supersede` set, a game that is still active is completed as
    /// [`CompletionReason::Superseded`](crate::CompletionReason::Superseded) in
    /// the same step and returned. Without it, an active game makes this fail
    /// with [`BingoError::ActiveGameExists`](crate::BingoError::ActiveGameExists).
    /// On failure nothing changes.
    async fn create_game(&self, game: &Game, supersede: bool) -> Result<Option<Game>>;

    /// The active game, if there is one. Never more than one.
    async fn get_active_game(&self) -> Result<Option<Game>>;

    async fn get_game(&self, game_id: Uuid) -> Result<Option<Game>>;

    /// Append `word` to the call history. Returns `None` when the game is no
    /// longer active or the word was already called.
    async fn append_call(&self, game_id: Uuid, word: &str) -> Result<Option<Game>>;

    /// Move the game from active to completed. Returns `None` when the game was
    /// not active any more, in which case nothing changes.
    async fn complete_game(&self, game_id: Uuid, completion: &Completion) -> Result<Option<Game>>;

    async fn get_card(&self, game_id: Uuid, player_id: &str) -> Result<Option<PlayerCard>>;

    /// Store a fresh card for the player. If the player already has one, the
    /// existing card is returned and `card` is discarded.
    async fn create_card(&self, game_id: Uuid, player_id: &str, card: &Card) -> Result<PlayerCard>;

    async fn set_stamped_positions(
        &self,
        game_id: Uuid,
        player_id: &str,
        stamped: &StampedSet,
    ) -> Result<()>;
}

/// SQLite database shared by the game, card and scheduler stores.
pub struct Storage {
    conn: Mutex<Connection>,
}

impl Storage {
    pub async fn new(db_path: &Path) -> Result<Self> {
        // Create parent directory if it doesn't exist
        if let Some(parent) = db_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let conn = Connection::open(db_path)?;
        // The caller loop and one-shot commands share the file
        conn.busy_timeout(std::time::Duration::from_secs(5))?;
        let storage = Self {
            conn: Mutex::new(conn),
        };

        storage.init_schema().await?;
        Ok(storage)
    }

    async fn init_schema(&self) -> Result<()> {
        let conn = self.conn.lock().await;

        conn.execute_batch("PRAGMA foreign_keys = ON;")?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS games (
                id TEXT PRIMARY KEY,
                channel TEXT NOT NULL,
                word_pool TEXT NOT NULL,
                status TEXT NOT NULL,
                winner TEXT,
                completion_reason TEXT,
                call_frequency_ms INTEGER NOT NULL,
                started_by TEXT NOT NULL,
                created_at INTEGER NOT NULL,
                completed_at INTEGER
            )",
            [],
        )?;

        // At most one active game
        conn.execute(
            "CREATE UNIQUE INDEX IF NOT EXISTS games_single_active
             ON games(status) WHERE status = 'active'",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS calls (
                game_id TEXT NOT NULL,
                seq INTEGER NOT NULL,
                word TEXT NOT NULL,
                called_at INTEGER NOT NULL,
                FOREIGN KEY (game_id) REFERENCES games(id),
                PRIMARY KEY (game_id, seq),
                UNIQUE (game_id, word)
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS cards (
                game_id TEXT NOT NULL,
                player_id TEXT NOT NULL,
                cells TEXT NOT NULL,
                stamped TEXT NOT NULL,
                created_at INTEGER NOT NULL,
                FOREIGN KEY (game_id) REFERENCES games(id),
                PRIMARY KEY (game_id, player_id)
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS scheduler (
                name TEXT PRIMARY KEY,
                enabled INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            )",
            [],
        )?;

        Ok(())
    }

    pub async fn get_connection(&self) -> tokio::sync::MutexGuard<'_, Connection> {
        self.conn.lock().await
    }
}

#[async_trait]
impl BingoStore for Storage {
    async fn create_game(&self, game: &Game, supersede: bool) -> Result<Option<Game>> {
        GameStore::new(self).create_game(game, supersede).await
    }

    async fn get_active_game(&self) -> Result<Option<Game>> {
        GameStore::new(self).get_active_game().await
    }

    async fn get_game(&self, game_id: Uuid) -> Result<Option<Game>> {
        GameStore::new(self).get_game(game_id).await
    }

    async fn append_call(&self, game_id: Uuid, word: &str) -> Result<Option<Game>> {
        GameStore::new(self).append_call(game_id, word).await
    }

    async fn complete_game(&self, game_id: Uuid, completion: &Completion) -> Result<Option<Game>> {
        GameStore::new(self).complete_game(game_id, completion).await
    }

    async fn get_card(&self, game_id: Uuid, player_id: &str) -> Result<Option<PlayerCard>> {
        CardStore::new(self).get_card(game_id, player_id).await
    }

    async fn create_card(&self, game_id: Uuid, player_id: &str, card: &Card) -> Result<PlayerCard> {
        CardStore::new(self).create_card(game_id, player_id, card).await
    }

    async fn set_stamped_positions(
        &self,
        game_id: Uuid,
        player_id: &str,
        stamped: &StampedSet,
    ) -> Result<()> {
        CardStore::new(self)
            .set_stamped_positions(game_id, player_id, stamped)
            .await
    }
}

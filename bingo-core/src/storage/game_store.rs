use crate::error::{BingoError, Result};
use crate::storage::Storage;
use crate::types::{Completion, CompletionReason, Game, GameStatus, WordPool};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::time::Duration;
use uuid::Uuid;

const GAME_COLUMNS: &str = "id, channel, word_pool, status, winner, completion_reason, \
     call_frequency_ms, started_by, created_at, completed_at";

/// Raw `games` row before the call history is attached.
struct GameRow {
    id: String,
    channel: String,
    word_pool: String,
    status: String,
    winner: Option<String>,
    completion_reason: Option<String>,
    call_frequency_ms: i64,
    started_by: String,
    created_at: i64,
    completed_at: Option<i64>,
}

impl GameRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            channel: row.get(1)?,
            word_pool: row.get(2)?,
            status: row.get(3)?,
            winner: row.get(4)?,
            completion_reason: row.get(5)?,
            call_frequency_ms: row.get(6)?,
            started_by: row.get(7)?,
            created_at: row.get(8)?,
            completed_at: row.get(9)?,
        })
    }

    fn into_game(self, call_history: Vec<String>) -> Result<Game> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| BingoError::corrupt(format!("Bad game id {}: {}", self.id, e)))?;
        let word_pool: WordPool = serde_json::from_str(&self.word_pool)?;
        let status = GameStatus::parse(&self.status)
            .ok_or_else(|| BingoError::corrupt(format!("Unknown game status: {}", self.status)))?;
        let completion_reason = match self.completion_reason {
            Some(reason) => Some(CompletionReason::parse(&reason).ok_or_else(|| {
                BingoError::corrupt(format!("Unknown completion reason: {}", reason))
            })?),
            None => None,
        };

        Ok(Game {
            id,
            channel: self.channel,
            word_pool,
            call_history,
            status,
            winner: self.winner,
            completion_reason,
            call_frequency: Duration::from_millis(self.call_frequency_ms.max(0) as u64),
            started_by: self.started_by,
            created_at: DateTime::<Utc>::from_timestamp_millis(self.created_at).unwrap_or_else(Utc::now),
            completed_at: self.completed_at.and_then(DateTime::<Utc>::from_timestamp_millis),
        })
    }
}

fn load_calls(conn: &Connection, game_id: &str) -> Result<Vec<String>> {
    let mut stmt = conn.prepare("SELECT word FROM calls WHERE game_id = ?1 ORDER BY seq ASC")?;
    let calls = stmt
        .query_map(params![game_id], |row| row.get(0))?
        .collect::<rusqlite::Result<Vec<String>>>()?;
    Ok(calls)
}

fn find_game(conn: &Connection, game_id: Uuid) -> Result<Option<Game>> {
    let row = conn
        .query_row(
            &format!("SELECT {} FROM games WHERE id = ?1", GAME_COLUMNS),
            params![game_id.to_string()],
            GameRow::from_row,
        )
        .optional()?;

    match row {
        Some(row) => {
            let calls = load_calls(conn, &row.id)?;
            Ok(Some(row.into_game(calls)?))
        }
        None => Ok(None),
    }
}

fn find_active_game(conn: &Connection) -> Result<Option<Game>> {
    let row = conn
        .query_row(
            &format!(
                "SELECT {} FROM games WHERE status = 'active' LIMIT 1",
                GAME_COLUMNS
            ),
            [],
            GameRow::from_row,
        )
        .optional()?;

    match row {
        Some(row) => {
            let calls = load_calls(conn, &row.id)?;
            Ok(Some(row.into_game(calls)?))
        }
        None => Ok(None),
    }
}

pub struct GameStore<'a> {
    storage: &'a Storage,
}

impl<'a> GameStore<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Insert the game row and its initial calls in one transaction, completing
    /// the active game first when `supersede` is set.
    pub async fn create_game(&self, game: &Game, supersede: bool) -> Result<Option<Game>> {
        if !game.is_active() {
            return Err(BingoError::internal(format!(
                "Refusing to create game {} in state {}",
                game.id,
                game.status.as_str()
            )));
        }
        let call_frequency_ms = i64::try_from(game.call_frequency.as_millis()).map_err(|_| {
            BingoError::invalid_frequency(format!("{:?} is too long", game.call_frequency))
        })?;

        let mut conn = self.storage.get_connection().await;
        let tx = conn.transaction()?;

        let active: Option<String> = tx
            .query_row(
                "SELECT id FROM games WHERE status = 'active' LIMIT 1",
                [],
                |row| row.get(0),
            )
            .optional()?;
        let superseded = match active {
            Some(active) => {
                let active_id = Uuid::parse_str(&active)
                    .map_err(|e| BingoError::corrupt(format!("Bad game id {}: {}", active, e)))?;
                if !supersede {
                    return Err(BingoError::ActiveGameExists(active_id));
                }

                tx.execute(
                    "UPDATE games
                     SET status = 'completed', completion_reason = ?2, completed_at = ?3
                     WHERE id = ?1 AND status = 'active'",
                    params![
                        active,
                        CompletionReason::Superseded.as_str(),
                        Utc::now().timestamp_millis(),
                    ],
                )?;
                Some(active_id)
            }
            None => None,
        };

        let game_id = game.id.to_string();
        tx.execute(
            &format!(
                "INSERT INTO games ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                GAME_COLUMNS
            ),
            params![
                game_id,
                game.channel,
                serde_json::to_string(&game.word_pool)?,
                game.status.as_str(),
                game.winner,
                game.completion_reason.map(|r| r.as_str()),
                call_frequency_ms,
                game.started_by,
                game.created_at.timestamp_millis(),
                game.completed_at.map(|t| t.timestamp_millis()),
            ],
        )?;

        let now = Utc::now().timestamp_millis();
        for (seq, word) in game.call_history.iter().enumerate() {
            tx.execute(
                "INSERT INTO calls (game_id, seq, word, called_at) VALUES (?1, ?2, ?3, ?4)",
                params![game_id, seq as i64 + 1, word, now],
            )?;
        }

        tx.commit()?;

        tracing::info!("Saved game {} in channel {}", game.id, game.channel);
        match superseded {
            Some(old_id) => {
                tracing::debug!("Game {} marked superseded by game {}", old_id, game.id);
                find_game(&conn, old_id)
            }
            None => Ok(None),
        }
    }

    pub async fn get_active_game(&self) -> Result<Option<Game>> {
        let conn = self.storage.get_connection().await;
        find_active_game(&conn)
    }

    pub async fn get_game(&self, game_id: Uuid) -> Result<Option<Game>> {
        let conn = self.storage.get_connection().await;
        find_game(&conn, game_id)
    }

    /// Append a call with a single guarded insert; no read-modify-write.
    pub async fn append_call(&self, game_id: Uuid, word: &str) -> Result<Option<Game>> {
        let conn = self.storage.get_connection().await;

        let inserted = conn.execute(
            "INSERT OR IGNORE INTO calls (game_id, seq, word, called_at)
             SELECT ?1, COALESCE((SELECT MAX(seq) FROM calls WHERE game_id = ?1), 0) + 1, ?2, ?3
             WHERE EXISTS (SELECT 1 FROM games WHERE id = ?1 AND status = 'active')",
            params![game_id.to_string(), word, Utc::now().timestamp_millis()],
        )?;

        if inserted == 0 {
            tracing::debug!("Call '{}' rejected for game {}", word, game_id);
            return Ok(None);
        }

        find_game(&conn, game_id)
    }

    /// Conditional Active -> Completed transition, judged by the affected row count.
    pub async fn complete_game(
        &self,
        game_id: Uuid,
        completion: &Completion,
    ) -> Result<Option<Game>> {
        let conn = self.storage.get_connection().await;

        let updated = conn.execute(
            "UPDATE games
             SET status = 'completed', winner = ?2, completion_reason = ?3, completed_at = ?4
             WHERE id = ?1 AND status = 'active'",
            params![
                game_id.to_string(),
                completion.winner,
                completion.reason.as_str(),
                Utc::now().timestamp_millis(),
            ],
        )?;

        if updated == 0 {
            return Ok(None);
        }

        tracing::info!(
            "Game {} completed ({})",
            game_id,
            completion.reason.as_str()
        );
        find_game(&conn, game_id)
    }
}

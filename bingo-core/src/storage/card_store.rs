use crate::error::{BingoError, Result};
use crate::storage::Storage;
use crate::types::{Card, PlayerCard, StampedSet};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

fn find_card(conn: &Connection, game_id: Uuid, player_id: &str) -> Result<Option<PlayerCard>> {
    let row: Option<(String, String, i64)> = conn
        .query_row(
            "SELECT cells, stamped, created_at FROM cards WHERE game_id = ?1 AND player_id = ?2",
            params![game_id.to_string(), player_id],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )
        .optional()?;

    let Some((cells, stamped, created_at)) = row else {
        return Ok(None);
    };

    let card: Card = serde_json::from_str(&cells)?;
    let stamped: StampedSet = serde_json::from_str(&stamped)?;

    Ok(Some(PlayerCard {
        game_id,
        player_id: player_id.to_string(),
        card,
        stamped,
        created_at: DateTime::<Utc>::from_timestamp_millis(created_at).unwrap_or_else(Utc::now),
    }))
}

pub struct CardStore<'a> {
    storage: &'a Storage,
}

impl<'a> CardStore<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    pub async fn get_card(&self, game_id: Uuid, player_id: &str) -> Result<Option<PlayerCard>> {
        let conn = self.storage.get_connection().await;
        find_card(&conn, game_id, player_id)
    }

    /// First writer wins: an existing card is kept and returned.
    pub async fn create_card(
        &self,
        game_id: Uuid,
        player_id: &str,
        card: &Card,
    ) -> Result<PlayerCard> {
        let conn = self.storage.get_connection().await;

        let inserted = conn.execute(
            "INSERT OR IGNORE INTO cards (game_id, player_id, cells, stamped, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                game_id.to_string(),
                player_id,
                serde_json::to_string(card)?,
                serde_json::to_string(&StampedSet::new())?,
                Utc::now().timestamp_millis(),
            ],
        )?;

        if inserted == 1 {
            tracing::info!("Dealt card to player {} in game {}", player_id, game_id);
        }

        find_card(&conn, game_id, player_id)?.ok_or_else(|| {
            BingoError::internal(format!(
                "Card for player {} in game {} vanished after insert",
                player_id, game_id
            ))
        })
    }

    pub async fn set_stamped_positions(
        &self,
        game_id: Uuid,
        player_id: &str,
        stamped: &StampedSet,
    ) -> Result<()> {
        let conn = self.storage.get_connection().await;

        let updated = conn.execute(
            "UPDATE cards SET stamped = ?3 WHERE game_id = ?1 AND player_id = ?2",
            params![
                game_id.to_string(),
                player_id,
                serde_json::to_string(stamped)?
            ],
        )?;

        if updated == 0 {
            return Err(BingoError::internal(format!(
                "No card for player {} in game {}",
                player_id, game_id
            )));
        }

        Ok(())
    }
}

use crate::error::Result;
use crate::storage::Storage;
use chrono::Utc;
use rusqlite::{params, OptionalExtension};

/// On/off switch for the periodic call trigger, keyed by rule name.
pub struct SchedulerStore<'a> {
    storage: &'a Storage,
}

impl<'a> SchedulerStore<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    pub async fn set_enabled(&self, name: &str, enabled: bool) -> Result<()> {
        let conn = self.storage.get_connection().await;

        conn.execute(
            "INSERT INTO scheduler (name, enabled, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(name) DO UPDATE SET enabled = excluded.enabled, updated_at = excluded.updated_at",
            params![name, enabled, Utc::now().timestamp()],
        )?;

        tracing::debug!("Scheduler rule '{}' enabled = {}", name, enabled);
        Ok(())
    }

    /// Rules that were never written are disabled.
    pub async fn is_enabled(&self, name: &str) -> Result<bool> {
        let conn = self.storage.get_connection().await;

        let enabled: Option<bool> = conn
            .query_row(
                "SELECT enabled FROM scheduler WHERE name = ?1",
                params![name],
                |row| row.get(0),
            )
            .optional()?;

        Ok(enabled.unwrap_or(false))
    }
}

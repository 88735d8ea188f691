//! SQLite conversation store implementation.
//!
//! Backend (b) of the `ConversationStore` contract: one row per turn,
//! parts serialized as JSON, timestamps as RFC 3339 text. The retention
//! window is enforced at read time and reclaimed by the periodic
//! `sweep_expired` delete, the SQL analogue of a TTL index.

use banterline_core::clock::{Clock, SystemClock};
use banterline_core::store::ConversationStore;
use banterline_types::config::MemoryConfig;
use banterline_types::error::StoreError;
use banterline_types::participant::ParticipantId;
use banterline_types::turn::{ContentPart, Turn, TurnRole};
use chrono::{DateTime, Duration, Utc};
use sqlx::Row;
use uuid::Uuid;

use std::sync::Arc;

use super::pool::DatabasePool;

/// SQLite-backed implementation of `ConversationStore`.
pub struct SqliteConversationStore {
    pool: DatabasePool,
    retention: Duration,
    cap: i64,
    clock: Arc<dyn Clock>,
}

impl SqliteConversationStore {
    /// Build a store on the system clock.
    pub fn new(pool: DatabasePool, config: &MemoryConfig) -> Self {
        Self::with_clock(pool, config, Arc::new(SystemClock))
    }

    /// Build a store on an injected clock.
    pub fn with_clock(pool: DatabasePool, config: &MemoryConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            pool,
            retention: config.retention_window(),
            cap: config.max_turns as i64,
            clock,
        }
    }

    fn window_cutoff(&self) -> String {
        format_datetime(&(self.clock.now() - self.retention))
    }
}

// ---------------------------------------------------------------------------
// Private Row type for SQLite-to-domain mapping
// ---------------------------------------------------------------------------

struct TurnRow {
    id: String,
    participant_id: String,
    role: String,
    parts: String,
    created_at: String,
}

impl TurnRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            participant_id: row.try_get("participant_id")?,
            role: row.try_get("role")?,
            parts: row.try_get("parts")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_turn(self) -> Result<Turn, StoreError> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| StoreError::Query(format!("invalid turn id: {e}")))?;
        let participant_id: ParticipantId =
            self.participant_id.parse().map_err(StoreError::Query)?;
        let role: TurnRole = self.role.parse().map_err(StoreError::Query)?;
        let parts: Vec<ContentPart> = serde_json::from_str(&self.parts)
            .map_err(|e| StoreError::Query(format!("invalid turn parts: {e}")))?;
        let created_at = parse_datetime(&self.created_at)?;

        Ok(Turn {
            id,
            participant_id,
            role,
            parts,
            created_at,
        })
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn parse_datetime(s: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StoreError::Query(format!("invalid datetime: {e}")))
}

fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

// ---------------------------------------------------------------------------
// ConversationStore implementation
// ---------------------------------------------------------------------------

impl ConversationStore for SqliteConversationStore {
    async fn append(
        &self,
        participant_id: ParticipantId,
        role: TurnRole,
        parts: Vec<ContentPart>,
    ) -> Result<(), StoreError> {
        let parts_json = serde_json::to_string(&parts)
            .map_err(|e| StoreError::Query(format!("unserializable parts: {e}")))?;

        sqlx::query(
            r#"INSERT INTO conversation_turns (id, participant_id, role, parts, created_at)
               VALUES (?, ?, ?, ?, ?)"#,
        )
        .bind(Uuid::now_v7().to_string())
        .bind(participant_id.to_string())
        .bind(role.to_string())
        .bind(parts_json)
        .bind(format_datetime(&self.clock.now()))
        .execute(&self.pool.writer)
        .await
        .map_err(|e| StoreError::Query(e.to_string()))?;

        Ok(())
    }

    async fn read_recent(&self, participant_id: ParticipantId) -> Result<Vec<Turn>, StoreError> {
        // Inner query picks the newest N inside the window; the outer
        // one restores oldest-first order. The v7 turn id breaks
        // same-timestamp ties chronologically.
        let rows = sqlx::query(
            r#"SELECT * FROM (
                   SELECT * FROM conversation_turns
                   WHERE participant_id = ? AND created_at > ?
                   ORDER BY created_at DESC, id DESC
                   LIMIT ?
               ) ORDER BY created_at ASC, id ASC"#,
        )
        .bind(participant_id.to_string())
        .bind(self.window_cutoff())
        .bind(self.cap)
        .fetch_all(&self.pool.reader)
        .await
        .map_err(|e| StoreError::Query(e.to_string()))?;

        let mut turns = Vec::with_capacity(rows.len());
        for row in &rows {
            let turn_row =
                TurnRow::from_row(row).map_err(|e| StoreError::Query(e.to_string()))?;
            turns.push(turn_row.into_turn()?);
        }

        Ok(turns)
    }

    async fn clear(&self, participant_id: ParticipantId) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM conversation_turns WHERE participant_id = ?")
            .bind(participant_id.to_string())
            .execute(&self.pool.writer)
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;
        Ok(())
    }

    async fn clear_all(&self) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM conversation_turns")
            .execute(&self.pool.writer)
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;
        Ok(())
    }

    async fn sweep_expired(&self) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM conversation_turns WHERE created_at <= ?")
            .bind(self.window_cutoff())
            .execute(&self.pool.writer)
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;
        Ok(result.rows_affected())
    }

    async fn participant_counts(&self) -> Result<Vec<(ParticipantId, u64)>, StoreError> {
        let rows = sqlx::query(
            r#"SELECT participant_id, COUNT(*) AS cnt
               FROM conversation_turns
               WHERE created_at > ?
               GROUP BY participant_id
               ORDER BY cnt DESC, participant_id ASC"#,
        )
        .bind(self.window_cutoff())
        .fetch_all(&self.pool.reader)
        .await
        .map_err(|e| StoreError::Query(e.to_string()))?;

        let mut counts = Vec::with_capacity(rows.len());
        for row in &rows {
            let participant_id: String = row
                .try_get("participant_id")
                .map_err(|e| StoreError::Query(e.to_string()))?;
            let cnt: i64 = row
                .try_get("cnt")
                .map_err(|e| StoreError::Query(e.to_string()))?;
            counts.push((
                participant_id.parse().map_err(StoreError::Query)?,
                cnt as u64,
            ));
        }

        Ok(counts)
    }
}

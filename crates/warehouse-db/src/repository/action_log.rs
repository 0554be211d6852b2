//! # Action Log Repository
//!
//! Append-only audit trail. The Reports view reads the same table back.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use tracing::debug;

use crate::error::DbResult;

/// One audit entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct ActionLogEntry {
    pub log_id: i64,
    pub user_id: Option<i64>,
    pub action: String,
    pub details: Option<String>,
    pub created_at: NaiveDateTime,
}

/// Repository for the action log.
#[derive(Debug, Clone)]
pub struct ActionLogRepository {
    pool: SqlitePool,
}

impl ActionLogRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ActionLogRepository { pool }
    }

    /// Appends an entry and returns its id.
    pub async fn record(
        &self,
        user_id: Option<i64>,
        action: &str,
        details: Option<&str>,
    ) -> DbResult<i64> {
        let result = sqlx::query("INSERT INTO action_log (user_id, action, details) VALUES (?1, ?2, ?3)")
            .bind(user_id)
            .bind(action)
            .bind(details)
            .execute(&self.pool)
            .await?;

        debug!(user_id = ?user_id, action = %action, "Action recorded");
        Ok(result.last_insert_rowid())
    }

    /// Most recent entries first.
    pub async fn recent(&self, limit: u32) -> DbResult<Vec<ActionLogEntry>> {
        let entries = sqlx::query_as::<_, ActionLogEntry>(
            r#"
            SELECT log_id, user_id, action, details, created_at
            FROM action_log
            ORDER BY log_id DESC
            LIMIT ?1
            "#,
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }
}

//! History record operations.

use crate::history::HistoryStore;
use crate::types::{HistoryRecord, NewHistoryRecord};
use crate::error::DatabaseError;
use crate::{Error, Result};
use async_trait::async_trait;

use super::{Database, HistoryRow};

impl Database {
    /// Insert a completed download into history
    ///
    /// `created_at` is stored with millisecond precision.
    pub async fn insert_history(&self, record: &NewHistoryRecord) -> Result<HistoryRecord> {
        let created_at_ms = chrono::Utc::now().timestamp_millis();
        let size = record
            .file_size_bytes
            .map(|n| i64::try_from(n).unwrap_or(i64::MAX));

        let result = sqlx::query(
            r#"
            INSERT INTO history (
                url, title, thumbnail_url, selector, format_label,
                duration_seconds, file_size_bytes, file_name, stored_path, created_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.url)
        .bind(&record.title)
        .bind(&record.thumbnail_url)
        .bind(&record.selector)
        .bind(&record.format_label)
        .bind(record.duration_seconds)
        .bind(size)
        .bind(&record.file_name)
        .bind(&record.stored_path)
        .bind(created_at_ms)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            Error::Persistence(DatabaseError::QueryFailed(format!(
                "failed to insert history record: {}",
                e
            )))
        })?;

        let id = result.last_insert_rowid();
        self.get_history_record(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("history record {}", id)))
    }

    /// Query history ordered by creation time (most recent first)
    pub async fn query_history(&self, limit: Option<usize>) -> Result<Vec<HistoryRecord>> {
        // SQLite treats a negative LIMIT as "no limit"
        let limit = limit.map_or(-1, |l| i64::try_from(l).unwrap_or(i64::MAX));

        let rows = sqlx::query_as::<_, HistoryRow>(
            r#"
            SELECT id, url, title, thumbnail_url, selector, format_label,
                   duration_seconds, file_size_bytes, file_name, stored_path, created_at
            FROM history
            ORDER BY created_at DESC, id DESC
            LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            Error::Persistence(DatabaseError::QueryFailed(format!(
                "failed to query history: {}",
                e
            )))
        })?;

        Ok(rows.into_iter().map(HistoryRecord::from).collect())
    }

    /// Get a single history record by ID
    pub async fn get_history_record(&self, id: i64) -> Result<Option<HistoryRecord>> {
        let row = sqlx::query_as::<_, HistoryRow>(
            r#"
            SELECT id, url, title, thumbnail_url, selector, format_label,
                   duration_seconds, file_size_bytes, file_name, stored_path, created_at
            FROM history
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            Error::Persistence(DatabaseError::QueryFailed(format!(
                "failed to get history record: {}",
                e
            )))
        })?;

        Ok(row.map(HistoryRecord::from))
    }

    /// Count history records
    pub async fn count_history(&self) -> Result<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM history")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                Error::Persistence(DatabaseError::QueryFailed(format!(
                    "failed to count history: {}",
                    e
                )))
            })
    }

    /// Delete all history records
    ///
    /// Returns the number of records deleted.
    pub async fn clear_history(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM history")
            .execute(&self.pool)
            .await
            .map_err(|e| {
                Error::Persistence(DatabaseError::QueryFailed(format!(
                    "failed to clear history: {}",
                    e
                )))
            })?;

        Ok(result.rows_affected())
    }
}

#[async_trait]
impl HistoryStore for Database {
    async fn insert(&self, record: NewHistoryRecord) -> Result<HistoryRecord> {
        self.insert_history(&record).await
    }

    async fn list_by_recency_desc(&self, limit: Option<usize>) -> Result<Vec<HistoryRecord>> {
        self.query_history(limit).await
    }

    async fn clear_all(&self) -> Result<u64> {
        self.clear_history().await
    }

    fn name(&self) -> &'static str {
        "sqlite"
    }
}

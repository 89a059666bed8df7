//! Database layer for ytdl-relay
//!
//! Handles SQLite persistence for the download history.
//!
//! ## Submodules
//!
//! Methods on [`Database`] are organized by domain:
//! - [`migrations`] - Database lifecycle, schema migrations
//! - [`history`] - History records and the [`HistoryStore`](crate::history::HistoryStore) impl

use crate::types::HistoryRecord;
use chrono::{TimeZone, Utc};
use sqlx::{FromRow, sqlite::SqlitePool};

mod history;
mod migrations;

/// History record from database (raw from SQLite)
#[derive(Debug, Clone, FromRow)]
pub struct HistoryRow {
    /// Unique database ID
    pub id: i64,
    /// Page URL
    pub url: String,
    /// Video title
    pub title: String,
    /// Thumbnail image URL
    pub thumbnail_url: Option<String>,
    /// Format selector used
    pub selector: String,
    /// Catalog label for the selector
    pub format_label: String,
    /// Duration in seconds
    pub duration_seconds: Option<f64>,
    /// Stored file size in bytes
    pub file_size_bytes: Option<i64>,
    /// Stored file name
    pub file_name: String,
    /// Full stored path
    pub stored_path: String,
    /// Unix timestamp in milliseconds when the record was created
    pub created_at: i64,
}

impl From<HistoryRow> for HistoryRecord {
    fn from(row: HistoryRow) -> Self {
        HistoryRecord {
            id: row.id,
            url: row.url,
            title: row.title,
            thumbnail_url: row.thumbnail_url,
            selector: row.selector,
            format_label: row.format_label,
            duration_seconds: row.duration_seconds,
            file_size_bytes: row.file_size_bytes.and_then(|n| u64::try_from(n).ok()),
            file_name: row.file_name,
            stored_path: row.stored_path,
            created_at: Utc
                .timestamp_millis_opt(row.created_at)
                .single()
                .unwrap_or_else(Utc::now),
        }
    }
}

/// Database handle for ytdl-relay
pub struct Database {
    pool: SqlitePool,
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;

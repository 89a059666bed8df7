//! History store abstraction
//!
//! A [`HistoryStore`] keeps one record per completed download. Two
//! implementations exist: [`crate::db::Database`] (SQLite, survives
//! restarts) and [`MemoryHistoryStore`] (process-local).

use crate::error::Result;
use crate::types::{HistoryRecord, NewHistoryRecord};
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

/// Persistent collection of completed-download records
///
/// Implementations must be safe to call from many sessions at once.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Store a record, assigning its identifier and creation time
    async fn insert(&self, record: NewHistoryRecord) -> Result<HistoryRecord>;

    /// Records ordered newest first, at most `limit` if given
    ///
    /// Records created in the same instant are ordered by descending id.
    async fn list_by_recency_desc(&self, limit: Option<usize>) -> Result<Vec<HistoryRecord>>;

    /// Remove every record; returns how many were removed
    async fn clear_all(&self) -> Result<u64>;

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}

#[derive(Default)]
struct MemoryInner {
    next_id: i64,
    records: Vec<HistoryRecord>,
}

/// In-memory history store
///
/// Identifiers start at 1 and are never reused, even after a clear.
#[derive(Default)]
pub struct MemoryHistoryStore {
    inner: Mutex<MemoryInner>,
}

impl MemoryHistoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HistoryStore for MemoryHistoryStore {
    async fn insert(&self, record: NewHistoryRecord) -> Result<HistoryRecord> {
        let mut inner = self.inner.lock().await;
        inner.next_id += 1;
        let stored = record.into_record(inner.next_id, Utc::now());
        inner.records.push(stored.clone());
        Ok(stored)
    }

    async fn list_by_recency_desc(&self, limit: Option<usize>) -> Result<Vec<HistoryRecord>> {
        let inner = self.inner.lock().await;
        let mut records = inner.records.clone();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        if let Some(limit) = limit {
            records.truncate(limit);
        }
        Ok(records)
    }

    async fn clear_all(&self) -> Result<u64> {
        let mut inner = self.inner.lock().await;
        let removed = inner.records.len() as u64;
        inner.records.clear();
        Ok(removed)
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

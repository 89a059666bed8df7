use super::sample_record;
use crate::db::*;
use crate::history::HistoryStore;
use std::sync::Arc;
use tempfile::NamedTempFile;

#[tokio::test]
async fn test_insert_history() {
    let temp_file = NamedTempFile::new().unwrap();
    let db = Database::new(temp_file.path()).await.unwrap();

    let before = chrono::Utc::now().timestamp_millis();
    let stored = db.insert_history(&sample_record("abc")).await.unwrap();
    assert!(stored.id > 0);
    assert!(stored.created_at.timestamp_millis() >= before);

    let retrieved = db.get_history_record(stored.id).await.unwrap().unwrap();
    assert_eq!(retrieved, stored);
    assert_eq!(retrieved.title, "abc");
    assert_eq!(retrieved.format_label, "M4A (audio only)");
    assert_eq!(retrieved.duration_seconds, Some(212.5));
    assert_eq!(retrieved.file_size_bytes, Some(3_437_753));
    assert_eq!(retrieved.file_name, "abc-1700000000000.m4a");

    db.close().await;
}

#[tokio::test]
async fn test_insert_history_with_missing_optionals() {
    let temp_file = NamedTempFile::new().unwrap();
    let db = Database::new(temp_file.path()).await.unwrap();

    let mut record = sample_record("bare");
    record.thumbnail_url = None;
    record.duration_seconds = None;
    record.file_size_bytes = None;

    let stored = db.insert_history(&record).await.unwrap();
    assert_eq!(stored.thumbnail_url, None);
    assert_eq!(stored.duration_seconds, None);
    assert_eq!(stored.file_size_bytes, None);

    db.close().await;
}

#[tokio::test]
async fn test_query_history_newest_first() {
    let temp_file = NamedTempFile::new().unwrap();
    let db = Database::new(temp_file.path()).await.unwrap();

    for title in ["first", "second", "third"] {
        db.insert_history(&sample_record(title)).await.unwrap();
    }

    let titles: Vec<String> = db
        .query_history(None)
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.title)
        .collect();
    assert_eq!(titles, vec!["third", "second", "first"]);

    db.close().await;
}

#[tokio::test]
async fn test_query_history_limit() {
    let temp_file = NamedTempFile::new().unwrap();
    let db = Database::new(temp_file.path()).await.unwrap();

    for i in 0..5 {
        db.insert_history(&sample_record(&format!("v{i}")))
            .await
            .unwrap();
    }

    let page = db.query_history(Some(2)).await.unwrap();
    assert_eq!(page.len(), 2);
    assert_eq!(page[0].title, "v4");
    assert_eq!(page[1].title, "v3");
    assert_eq!(db.query_history(Some(0)).await.unwrap().len(), 0);
    assert_eq!(db.count_history().await.unwrap(), 5);

    db.close().await;
}

#[tokio::test]
async fn test_same_millisecond_ties_break_on_id() {
    let temp_file = NamedTempFile::new().unwrap();
    let db = Database::new(temp_file.path()).await.unwrap();

    let a = db.insert_history(&sample_record("a")).await.unwrap();
    let b = db.insert_history(&sample_record("b")).await.unwrap();

    sqlx::query("UPDATE history SET created_at = 1700000000000")
        .execute(db.pool())
        .await
        .unwrap();

    let ids: Vec<i64> = db
        .query_history(None)
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.id)
        .collect();
    assert_eq!(ids, vec![b.id, a.id]);

    db.close().await;
}

#[tokio::test]
async fn test_clear_history() {
    let temp_file = NamedTempFile::new().unwrap();
    let db = Database::new(temp_file.path()).await.unwrap();

    db.insert_history(&sample_record("a")).await.unwrap();
    db.insert_history(&sample_record("b")).await.unwrap();

    assert_eq!(db.clear_history().await.unwrap(), 2);
    assert!(db.query_history(None).await.unwrap().is_empty());
    assert_eq!(db.clear_history().await.unwrap(), 0);

    db.close().await;
}

#[tokio::test]
async fn test_history_survives_reopen() {
    let temp_file = NamedTempFile::new().unwrap();
    {
        let db = Database::new(temp_file.path()).await.unwrap();
        db.insert_history(&sample_record("kept")).await.unwrap();
        db.close().await;
    }

    let db = Database::new(temp_file.path()).await.unwrap();
    let records = db.query_history(None).await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].title, "kept");

    db.close().await;
}

#[tokio::test]
async fn test_history_store_trait_on_database() {
    let temp_file = NamedTempFile::new().unwrap();
    let db = Database::new(temp_file.path()).await.unwrap();
    let store: &dyn HistoryStore = &db;

    assert_eq!(store.name(), "sqlite");
    let stored = store.insert(sample_record("t")).await.unwrap();
    let listed = store.list_by_recency_desc(Some(10)).await.unwrap();
    assert_eq!(listed, vec![stored]);
    assert_eq!(store.clear_all().await.unwrap(), 1);
    assert!(store.list_by_recency_desc(None).await.unwrap().is_empty());

    db.close().await;
}

#[tokio::test]
async fn test_concurrent_inserts() {
    let temp_file = NamedTempFile::new().unwrap();
    let db = Arc::new(Database::new(temp_file.path()).await.unwrap());

    let mut handles = Vec::new();
    for i in 0..10 {
        let db = db.clone();
        handles.push(tokio::spawn(async move {
            db.insert_history(&sample_record(&format!("c{i}")))
                .await
                .unwrap()
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(db.count_history().await.unwrap(), 10);
}

//! Event record storage.
//!
//! Records live in a single `events` table keyed by `event_id`, with the full
//! record kept as JSONB. Creation is conditional on the key being absent;
//! there is no update path.

use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::PgPool;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::info;

use crate::models::EventRecord;
use crate::{Error, Result};

const CREATE_EVENTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS events (
    event_id   TEXT PRIMARY KEY,
    record     JSONB NOT NULL,
    created_at BIGINT NOT NULL,
    updated_at BIGINT NOT NULL
)
"#;

/// Structured record store with create-if-absent writes.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Insert a record. Fails with [`Error::Conflict`] if the id is taken.
    async fn create(&self, record: &EventRecord) -> Result<()>;

    async fn get(&self, event_id: &str) -> Result<Option<EventRecord>>;

    /// All records, newest first.
    async fn list(&self) -> Result<Vec<EventRecord>>;
}

/// Postgres-backed record store.
pub struct PgRecordStore {
    pool: PgPool,
}

impl PgRecordStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the `events` table if it does not exist yet.
    pub async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(CREATE_EVENTS_TABLE).execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn create(&self, record: &EventRecord) -> Result<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO events (event_id, record, created_at, updated_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (event_id) DO NOTHING
            "#,
        )
        .bind(&record.event_id)
        .bind(Json(record))
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(Error::Conflict(format!(
                "event {} already exists",
                record.event_id
            )));
        }

        info!(event_id = %record.event_id, "Stored event record");
        Ok(())
    }

    async fn get(&self, event_id: &str) -> Result<Option<EventRecord>> {
        let record = sqlx::query_scalar::<_, Json<EventRecord>>(
            "SELECT record FROM events WHERE event_id = $1",
        )
        .bind(event_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record.map(|Json(record)| record))
    }

    async fn list(&self) -> Result<Vec<EventRecord>> {
        let records = sqlx::query_scalar::<_, Json<EventRecord>>(
            "SELECT record FROM events ORDER BY created_at DESC, event_id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(records.into_iter().map(|Json(record)| record).collect())
    }
}

/// In-memory record store for tests and local runs.
#[derive(Default)]
pub struct MemoryRecordStore {
    records: RwLock<HashMap<String, EventRecord>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn create(&self, record: &EventRecord) -> Result<()> {
        let mut records = self.records.write().await;
        if records.contains_key(&record.event_id) {
            return Err(Error::Conflict(format!(
                "event {} already exists",
                record.event_id
            )));
        }
        records.insert(record.event_id.clone(), record.clone());
        Ok(())
    }

    async fn get(&self, event_id: &str) -> Result<Option<EventRecord>> {
        Ok(self.records.read().await.get(event_id).cloned())
    }

    async fn list(&self) -> Result<Vec<EventRecord>> {
        let mut records: Vec<EventRecord> = self.records.read().await.values().cloned().collect();
        records.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.event_id.cmp(&b.event_id))
        });
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EventStatus, Template};

    fn record(id: &str, name: &str, created_at: i64) -> EventRecord {
        EventRecord {
            event_id: id.into(),
            created_at,
            updated_at: created_at,
            status: EventStatus::Active,
            event_name: name.into(),
            event_date: "2025-01-01".into(),
            event_time: String::new(),
            venue: String::new(),
            description: String::new(),
            organizer: String::new(),
            contact_email: String::new(),
            registration_url: String::new(),
            video_url: String::new(),
            selected_template: Template::Classic,
            hero_image: String::new(),
            logo: String::new(),
            speakers: vec![],
            sponsors: vec![],
            agenda: vec![],
            gallery: vec![],
        }
    }

    #[tokio::test]
    async fn test_create_then_get() {
        let store = MemoryRecordStore::new();
        store.create(&record("a", "First", 1)).await.unwrap();

        let fetched = store.get("a").await.unwrap().unwrap();
        assert_eq!(fetched.event_name, "First");
        assert!(store.get("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_colliding_create_never_overwrites() {
        let store = MemoryRecordStore::new();
        store.create(&record("a", "Original", 1)).await.unwrap();

        let err = store.create(&record("a", "Impostor", 2)).await.unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));
        assert_eq!(err.status_code(), 409);
        assert_eq!(store.get("a").await.unwrap().unwrap().event_name, "Original");
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let store = MemoryRecordStore::new();
        store.create(&record("old", "Old", 10)).await.unwrap();
        store.create(&record("new", "New", 20)).await.unwrap();

        let ids: Vec<String> = store
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.event_id)
            .collect();
        assert_eq!(ids, vec!["new", "old"]);
    }
}

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use payhook_common::{AppError, RedisKeys, RedisService};

use crate::models::StoredRecord;

/// Destination table for normalized records.
///
/// `put` is an unconditional full overwrite keyed by the record id: there is
/// no read-before-write and no version check.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn put(&self, record: &StoredRecord) -> Result<(), AppError>;

    /// Read-back for tests and diagnostics. The webhook path never reads
    /// before it writes.
    async fn get(&self, id: &str) -> Result<Option<StoredRecord>, AppError>;

    async fn health_check(&self) -> Result<(), AppError> {
        Ok(())
    }

    fn backend(&self) -> &'static str;
}

/// Writes one record. Refuses records without an id so nothing is ever
/// stored under an empty key.
pub async fn save_record(store: &dyn RecordStore, record: &StoredRecord) -> Result<(), AppError> {
    if record.id().trim().is_empty() {
        return Err(AppError::Validation("Record id must not be empty".to_string()));
    }

    store.put(record).await?;

    tracing::info!(
        record_id = record.id(),
        data_type = %record.data_type(),
        backend = store.backend(),
        "Record saved"
    );

    Ok(())
}

/// Records live as JSON documents under `{table}:{id}`.
#[derive(Clone)]
pub struct RedisRecordStore {
    redis: RedisService,
    table_name: String,
}

impl RedisRecordStore {
    pub fn new(redis: RedisService, table_name: impl Into<String>) -> Self {
        Self {
            redis,
            table_name: table_name.into(),
        }
    }

    fn key(&self, id: &str) -> String {
        RedisKeys::record(&self.table_name, id)
    }
}

#[async_trait]
impl RecordStore for RedisRecordStore {
    async fn put(&self, record: &StoredRecord) -> Result<(), AppError> {
        self.redis.put_json(&self.key(record.id()), record).await
    }

    async fn get(&self, id: &str) -> Result<Option<StoredRecord>, AppError> {
        self.redis.get_json(&self.key(id)).await
    }

    async fn health_check(&self) -> Result<(), AppError> {
        self.redis.health_check().await
    }

    fn backend(&self) -> &'static str {
        "redis"
    }
}

/// In-process table for tests and local runs without Redis.
#[derive(Clone, Default)]
pub struct MemoryRecordStore {
    records: Arc<RwLock<HashMap<String, StoredRecord>>>,
    writes: Arc<AtomicUsize>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `put` calls so far, including overwrites.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn put(&self, record: &StoredRecord) -> Result<(), AppError> {
        let mut records = self.records.write().await;
        records.insert(record.id().to_string(), record.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<StoredRecord>, AppError> {
        let records = self.records.read().await;
        Ok(records.get(id).cloned())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{SubscriptionRecord, UNKNOWN_NAME, UNKNOWN_PURPOSE, UNKNOWN_TIME};

    fn subscription(id: &str, email: &str) -> StoredRecord {
        StoredRecord::Subscription(SubscriptionRecord {
            id: id.to_string(),
            purpose: UNKNOWN_PURPOSE.to_string(),
            user_name: UNKNOWN_NAME.to_string(),
            user_email: email.to_string(),
            create_time: UNKNOWN_TIME.to_string(),
        })
    }

    #[tokio::test]
    async fn test_save_and_get() {
        let store = MemoryRecordStore::new();
        save_record(&store, &subscription("I-1", "a@b.com")).await.unwrap();

        let stored = store.get("I-1").await.unwrap();
        assert_eq!(stored, Some(subscription("I-1", "a@b.com")));
        assert_eq!(store.write_count(), 1);
    }

    #[tokio::test]
    async fn test_same_id_overwrites() {
        let store = MemoryRecordStore::new();
        save_record(&store, &subscription("I-1", "first@example.com")).await.unwrap();
        save_record(&store, &subscription("I-1", "second@example.com")).await.unwrap();

        assert_eq!(store.write_count(), 2);
        assert_eq!(store.len().await, 1);
        assert_eq!(
            store.get("I-1").await.unwrap(),
            Some(subscription("I-1", "second@example.com"))
        );
    }

    #[tokio::test]
    async fn test_empty_id_is_never_written() {
        let store = MemoryRecordStore::new();
        let err = save_record(&store, &subscription(" ", "a@b.com")).await.unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(store.write_count(), 0);
        assert!(store.is_empty().await);
    }
}

use redis::{aio::ConnectionManager, AsyncCommands, Client};
use serde::{Deserialize, Serialize};

use crate::{AppError, RedisConfig};

/// Async client over a Redis connection manager. Each call works on a clone
/// of the manager.
#[derive(Clone)]
pub struct RedisService {
    manager: ConnectionManager,
}

impl RedisService {
    pub async fn new(config: &RedisConfig) -> Result<Self, AppError> {
        let client = Client::open(config.connection_string())?;
        let manager = ConnectionManager::new(client).await?;

        let service = Self { manager };
        service.health_check().await?;

        tracing::info!(host = %config.host, port = config.port, "Redis connection established");

        Ok(service)
    }

    /// Writes `value` as a JSON document under `key`, replacing whatever was
    /// stored there. No expiry is set.
    pub async fn put_json<T>(&self, key: &str, value: &T) -> Result<(), AppError>
    where
        T: Serialize,
    {
        let serialized = serde_json::to_string(value)?;
        let mut conn = self.manager.clone();
        conn.set::<_, _, ()>(key, serialized).await?;
        Ok(())
    }

    pub async fn get_json<T>(&self, key: &str) -> Result<Option<T>, AppError>
    where
        T: for<'de> Deserialize<'de>,
    {
        let mut conn = self.manager.clone();
        let result: Option<String> = conn.get(key).await?;

        match result {
            Some(data) => Ok(Some(serde_json::from_str(&data)?)),
            None => Ok(None),
        }
    }

    /// Test support: clears keys written by integration tests. The webhook
    /// path never deletes records.
    pub async fn delete(&self, key: &str) -> Result<(), AppError> {
        let mut conn = self.manager.clone();
        conn.del::<_, ()>(key).await?;
        Ok(())
    }

    // Health check
    pub async fn health_check(&self) -> Result<(), AppError> {
        let mut conn = self.manager.clone();
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }
}

// Redis key builders
pub struct RedisKeys;

impl RedisKeys {
    /// Key of a single record inside a logical table, `{table}:{id}`.
    pub fn record(table: &str, id: &str) -> String {
        format!("{}:{}", table, id)
    }
}

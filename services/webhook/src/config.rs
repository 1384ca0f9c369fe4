use std::str::FromStr;

use payhook_common::{AppError, RedisConfig, ServerConfig};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookConfig {
    pub server: ServerConfig,
    pub redis: RedisConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Logical table the records are written to. There is no default.
    pub table_name: String,
    pub backend: StoreBackend,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Redis,
    Memory,
}

impl WebhookConfig {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let table_name = lookup("WEBHOOK_TABLE_NAME")
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .ok_or_else(|| AppError::Configuration("WEBHOOK_TABLE_NAME must be set".to_string()))?;

        let backend = match var("WEBHOOK_STORE", "redis").to_lowercase().as_str() {
            "redis" => StoreBackend::Redis,
            "memory" => StoreBackend::Memory,
            other => {
                return Err(AppError::Configuration(format!(
                    "WEBHOOK_STORE must be 'redis' or 'memory', got '{}'",
                    other
                )))
            }
        };

        Ok(Self {
            server: ServerConfig {
                host: var("WEBHOOK_HOST", "0.0.0.0"),
                port: parse_number("WEBHOOK_PORT", &var("WEBHOOK_PORT", "8010"))?,
            },
            redis: RedisConfig {
                host: var("REDIS_HOST", "localhost"),
                port: parse_number("REDIS_PORT", &var("REDIS_PORT", "6379"))?,
                password: lookup("REDIS_PASSWORD").filter(|p| !p.is_empty()),
                database: parse_number("REDIS_DATABASE", &var("REDIS_DATABASE", "0"))?,
            },
            storage: StorageConfig { table_name, backend },
        })
    }
}

fn parse_number<T: FromStr>(key: &str, raw: &str) -> Result<T, AppError> {
    raw.trim()
        .parse()
        .map_err(|_| AppError::Configuration(format!("{} must be a number in range, got '{}'", key, raw)))
}

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;
use chrono::{DateTime, Utc};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Extraction error: {0}")]
    Extraction(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error_code: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub request_id: String,
}

impl ApiError {
    pub fn new(error_code: String, message: String) -> Self {
        Self {
            error_code,
            message,
            timestamp: Utc::now(),
            request_id: Uuid::new_v4().to_string(),
        }
    }
}

// HTTP status code mapping
impl AppError {
    pub fn status_code(&self) -> u16 {
        match self {
            AppError::Validation(_) => 400,
            AppError::Extraction(_) => 422,
            _ => 500,
        }
    }

    pub fn error_code(&self) -> &str {
        match self {
            AppError::Redis(_) => "STORAGE_ERROR",
            AppError::Serialization(_) => "SERIALIZATION_ERROR",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Extraction(_) => "EXTRACTION_ERROR",
            AppError::Configuration(_) => "CONFIGURATION_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Client errors are safe to echo back to the sender verbatim.
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status_code())
    }

    /// Converts the error into the wire-level error body. Server-side detail
    /// stays in the logs.
    pub fn to_api_error(&self) -> ApiError {
        let message = if self.is_client_error() {
            self.to_string()
        } else {
            "An unexpected error occurred.".to_string()
        };
        ApiError::new(self.error_code().to_string(), message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(AppError::Validation("x".into()).status_code(), 400);
        assert_eq!(AppError::Extraction("x".into()).status_code(), 422);
        assert_eq!(AppError::Internal("x".into()).status_code(), 500);
        assert_eq!(AppError::Configuration("x".into()).status_code(), 500);

        let redis_error = AppError::from(redis::RedisError::from((
            redis::ErrorKind::IoError,
            "connection refused",
        )));
        assert_eq!(redis_error.status_code(), 500);
        assert_eq!(redis_error.error_code(), "STORAGE_ERROR");

        let json_error = AppError::from(serde_json::from_str::<serde_json::Value>("{").unwrap_err());
        assert_eq!(json_error.status_code(), 500);
        assert_eq!(json_error.error_code(), "SERIALIZATION_ERROR");
        assert!(!json_error.is_client_error());
    }

    #[test]
    fn test_server_errors_hide_detail() {
        let err = AppError::Internal("connection refused on 10.0.0.4".into());
        let api_error = err.to_api_error();
        assert_eq!(api_error.error_code, "INTERNAL_ERROR");
        assert!(!api_error.message.contains("10.0.0.4"));

        let err = AppError::Validation("Missing required field: resource".into());
        let api_error = err.to_api_error();
        assert_eq!(api_error.error_code, "VALIDATION_ERROR");
        assert!(api_error.message.contains("resource"));
    }
}

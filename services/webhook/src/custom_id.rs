//! Parser for the caller-supplied custom metadata string.
//!
//! The checkout flow attaches an opaque string to each order or subscription
//! and the platform echoes it back in later notifications. Two encodings are
//! understood:
//!
//! * delimited: `purpose:mentoring|user_name:ana|email:ana@example.com`, where
//!   a segment may also use `=` instead of `:`;
//! * JSON: `{"purpose": "mentoring", "email": "ana@example.com"}`.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MetadataError {
    #[error("invalid segment '{0}', expected key:value")]
    MalformedSegment(String),

    #[error("invalid JSON metadata: {0}")]
    InvalidJson(String),

    #[error("metadata value for '{0}' is not a string")]
    NonStringValue(String),
}

const SEGMENT_DELIMITER: char = '|';
const KEY_VALUE_SEPARATORS: [char; 2] = [':', '='];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomMetadata {
    pub purpose: Option<String>,
    pub user_name: Option<String>,
    pub user_email: Option<String>,
}

impl CustomMetadata {
    /// Strict parse: the first malformed segment fails the whole string.
    pub fn parse(raw: &str) -> Result<Self, MetadataError> {
        let (metadata, mut errors) = Self::parse_lossy(raw);
        if errors.is_empty() {
            Ok(metadata)
        } else {
            Err(errors.remove(0))
        }
    }

    /// Keeps every well-formed entry and reports the ones it had to skip.
    pub fn parse_lossy(raw: &str) -> (Self, Vec<MetadataError>) {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return (Self::default(), Vec::new());
        }

        if trimmed.starts_with('{') {
            return Self::parse_json(trimmed);
        }

        let mut metadata = Self::default();
        let mut errors = Vec::new();

        for segment in trimmed.split(SEGMENT_DELIMITER) {
            match split_segment(segment) {
                Some((key, value)) => metadata.assign(key, value),
                None => errors.push(MetadataError::MalformedSegment(segment.to_string())),
            }
        }

        (metadata, errors)
    }

    fn parse_json(raw: &str) -> (Self, Vec<MetadataError>) {
        let object = match serde_json::from_str::<serde_json::Map<String, serde_json::Value>>(raw) {
            Ok(object) => object,
            Err(e) => return (Self::default(), vec![MetadataError::InvalidJson(e.to_string())]),
        };

        let mut metadata = Self::default();
        let mut errors = Vec::new();

        for (key, value) in &object {
            match value.as_str() {
                Some(value) => metadata.assign(key.trim(), value),
                None => errors.push(MetadataError::NonStringValue(key.clone())),
            }
        }

        (metadata, errors)
    }

    fn assign(&mut self, key: &str, value: &str) {
        let slot = match key {
            "purpose" => &mut self.purpose,
            "user_name" | "name" => &mut self.user_name,
            "email" | "user_email" => &mut self.user_email,
            _ => {
                tracing::debug!(key, "Ignoring unknown custom metadata key");
                return;
            }
        };
        *slot = Some(value.to_string());
    }
}

fn split_segment(segment: &str) -> Option<(&str, &str)> {
    let (key, value) = segment.split_once(KEY_VALUE_SEPARATORS)?;
    let key = key.trim();
    if key.is_empty() {
        None
    } else {
        Some((key, value))
    }
}

use axum::http::{header::CONTENT_TYPE, HeaderMap};

use payhook_common::AppError;

use crate::models::WebhookEvent;

const JSON_MEDIA_TYPE: &str = "application/json";
const REQUIRED_FIELDS: [&str; 2] = ["event_type", "resource"];

/// Accepts `application/json`, with or without parameters such as a charset.
pub fn validate_content_type(headers: &HeaderMap) -> Result<(), AppError> {
    let invalid = || AppError::Validation("Invalid Content-Type. Expected 'application/json'.".to_string());

    let value = headers
        .get(CONTENT_TYPE)
        .ok_or_else(invalid)?
        .to_str()
        .map_err(|_| invalid())?;

    let media_type = value.split(';').next().unwrap_or_default().trim();
    if media_type.eq_ignore_ascii_case(JSON_MEDIA_TYPE) {
        Ok(())
    } else {
        Err(invalid())
    }
}

/// Parses the raw body and checks the envelope fields every event must carry.
pub fn parse_event(body: &[u8]) -> Result<WebhookEvent, AppError> {
    let value: serde_json::Value = serde_json::from_slice(body)
        .map_err(|e| AppError::Validation(format!("Invalid JSON body: {}", e)))?;

    let mut object = match value {
        serde_json::Value::Object(object) => object,
        _ => return Err(AppError::Validation("Request body must be a JSON object".to_string())),
    };

    for field in REQUIRED_FIELDS {
        if !object.contains_key(field) {
            return Err(AppError::Validation(format!("Missing required field: {}", field)));
        }
    }

    let event_type = match object.remove("event_type") {
        Some(serde_json::Value::String(event_type)) if !event_type.trim().is_empty() => event_type,
        _ => return Err(AppError::Validation("Field event_type must be a non-empty string".to_string())),
    };

    let resource = match object.remove("resource") {
        Some(resource @ serde_json::Value::Object(_)) => resource,
        _ => return Err(AppError::Validation("Field resource must be a JSON object".to_string())),
    };

    Ok(WebhookEvent { event_type, resource })
}

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::Json,
};

use payhook_common::{ApiError, ApiResponse, AppError};

use crate::models::{HealthStatus, WebhookAck};
use crate::AppState;

type ErrorResponse = (StatusCode, Json<ApiError>);

fn error_response(err: &AppError) -> ErrorResponse {
    let status = StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(err.to_api_error()))
}

// Webhook endpoint
pub async fn handle_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<ApiResponse<WebhookAck>>, ErrorResponse> {
    match state.processor.process(&headers, &body).await {
        Ok(outcome) => Ok(Json(ApiResponse::success(WebhookAck::from(outcome)))),
        Err(err) => Err(error_response(&err)),
    }
}

// Health check endpoint
pub async fn health_check(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<HealthStatus>>, ErrorResponse> {
    let store = state.processor.store();

    if let Err(err) = store.health_check().await {
        tracing::error!(error = %err, backend = store.backend(), "Store health check failed");
        return Err(error_response(&err));
    }

    Ok(Json(ApiResponse::success(HealthStatus {
        service: "Webhook service is healthy".to_string(),
        store: store.backend().to_string(),
    })))
}

pub async fn handler_404() -> (StatusCode, Json<ApiResponse<()>>) {
    (
        StatusCode::NOT_FOUND,
        Json(ApiResponse::error("Endpoint not found".to_string())),
    )
}

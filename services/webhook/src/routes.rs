use axum::{
    routing::{get, post},
    Router,
};

use crate::{handlers, AppState};

pub fn create_routes() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))

        // Webhook endpoint (no auth, the sender is not verified)
        .route("/webhook", post(handlers::handle_webhook))
}

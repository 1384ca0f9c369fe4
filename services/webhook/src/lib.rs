pub mod config;
pub mod custom_id;
pub mod events;
pub mod extractors;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod storage;
pub mod validation;
pub mod webhooks;

use std::sync::Arc;

use axum::Router;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::storage::RecordStore;
use crate::webhooks::WebhookProcessor;

#[derive(Clone)]
pub struct AppState {
    pub processor: WebhookProcessor,
}

impl AppState {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            processor: WebhookProcessor::new(store),
        }
    }
}

/// Full application router, ready to be served.
pub fn create_app(state: AppState) -> Router {
    routes::create_routes()
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .fallback(handlers::handler_404)
        .with_state(state)
}

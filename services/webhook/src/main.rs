use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use payhook_common::RedisService;
use payhook_webhook::{
    config::{StoreBackend, WebhookConfig},
    create_app,
    storage::{MemoryRecordStore, RecordStore, RedisRecordStore},
    AppState,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "payhook_webhook=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = WebhookConfig::from_env()?;

    let store: Arc<dyn RecordStore> = match config.storage.backend {
        StoreBackend::Redis => {
            let redis_service = RedisService::new(&config.redis).await?;
            Arc::new(RedisRecordStore::new(redis_service, config.storage.table_name.clone()))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using the in-memory record store, records will not survive a restart");
            Arc::new(MemoryRecordStore::new())
        }
    };

    let app = create_app(AppState::new(store));

    // Start the server
    let listener = tokio::net::TcpListener::bind(config.server.bind_address()).await?;

    tracing::info!(
        address = %config.server.bind_address(),
        table = %config.storage.table_name,
        "Webhook service listening"
    );

    axum::serve(listener, app).await?;

    Ok(())
}

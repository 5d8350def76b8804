//! AirHealth Cloud Server
//!
//! Loads the model bundle and advisory table once, wires the configured
//! store and notification transport, then serves the API.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use airhealth_cloud::config::{Config, StoreBackend};
use airhealth_cloud::store::{JsonlStore, MemoryStore};
use airhealth_cloud::{create_router, AppState};
use airhealth_core::constants::{APP_NAME, APP_VERSION};
use airhealth_core::{
    load_bundle, AdvisoryTable, NotificationTransport, NullTransport, RiskPipeline, WebhookTransport,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env before the filter reads RUST_LOG
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "airhealth_cloud=debug,airhealth_core=info,tower_http=debug".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();

    tracing::info!(
        "{} Cloud Server v{} starting ({})...",
        APP_NAME,
        APP_VERSION,
        config.environment
    );

    let bundle = load_bundle(&config.model_path, config.model_sha256.as_deref())
        .with_context(|| format!("Failed to load model from {}", config.model_path))?;

    let advisory = AdvisoryTable::load(config.advisory_path.as_deref())
        .context("Failed to load advisory table")?;

    let pipeline = Arc::new(RiskPipeline::new(Arc::new(bundle), Arc::new(advisory)));

    let notifier: Arc<dyn NotificationTransport> = match &config.webhook_url {
        Some(url) => {
            tracing::info!("Alerts via {} webhook", config.webhook_platform.as_str());
            Arc::new(WebhookTransport::new(
                url.clone(),
                config.webhook_platform,
                config.alert_to.clone(),
                config.alert_timeout(),
            ))
        }
        None => {
            tracing::warn!("ALERT_WEBHOOK_URL not set, alerts will only be logged");
            Arc::new(NullTransport)
        }
    };

    // Build application state
    let state = match config.store_backend {
        StoreBackend::Jsonl => {
            let store = JsonlStore::open_with_limit(&config.data_dir, config.store_max_file_bytes)
                .with_context(|| format!("Failed to open store at {}", config.data_dir.display()))?;
            AppState::with_store(pipeline, Arc::new(store), notifier, config.clone())
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store, data is lost on restart");
            AppState::with_store(pipeline, Arc::new(MemoryStore::new()), notifier, config.clone())
        }
    };

    // Build router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}

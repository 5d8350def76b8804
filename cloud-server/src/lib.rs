//! AirHealth Cloud Backend
//!
//! HTTP surface over the health-risk pipeline.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    AIRHEALTH CLOUD                          │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌───────────┐  ┌─────────────────┐  ┌──────────────────┐  │
//! │  │  API      │  │  RiskPipeline   │  │  Notification    │  │
//! │  │  (Axum)   │─►│  (blocking pool)│─►│  Transport       │  │
//! │  └─────┬─────┘  └─────────────────┘  └──────────────────┘  │
//! │        ▼                                                    │
//! │  ┌─────────────────────────────┐                           │
//! │  │ Snapshot / Record store     │                           │
//! │  │ (JSONL or memory)           │                           │
//! │  └─────────────────────────────┘                           │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod store;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{
    cors::{CorsLayer, Any},
    trace::TraceLayer,
    compression::CompressionLayer,
};

use airhealth_core::{NotificationTransport, RiskPipeline};

pub use config::Config;
pub use error::{AppError, AppResult};
use store::{RecordSink, SnapshotSink, SnapshotSource};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<RiskPipeline>,
    pub snapshot_source: Arc<dyn SnapshotSource>,
    pub snapshot_sink: Arc<dyn SnapshotSink>,
    pub records: Arc<dyn RecordSink>,
    pub notifier: Arc<dyn NotificationTransport>,
    pub config: Config,
}

impl AppState {
    /// State backed by one store serving snapshots and records
    pub fn with_store<S>(
        pipeline: Arc<RiskPipeline>,
        store: Arc<S>,
        notifier: Arc<dyn NotificationTransport>,
        config: Config,
    ) -> Self
    where
        S: SnapshotSource + SnapshotSink + RecordSink + 'static,
    {
        Self {
            pipeline,
            snapshot_source: store.clone(),
            snapshot_sink: store.clone(),
            records: store,
            notifier,
            config,
        }
    }
}

/// Create the main router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health::check))
        .route("/api/v1/predict_disease", post(handlers::predict::predict_disease))
        .route("/api/v1/predict_from_cloud", get(handlers::predict::predict_from_cloud))
        .route("/api/v1/ingest_from_device", post(handlers::ingest::ingest_from_device))
        .route("/api/v1/sensor_data", post(handlers::sensor_data::upload))
        .route("/api/v1/predictions/:id", get(handlers::predictions::get))
        .route("/api/v1/model", get(handlers::model::info))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        )
        .with_state(state)
}

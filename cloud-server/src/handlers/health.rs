//! Health check handler

use axum::{extract::State, Json};
use serde::Serialize;

use airhealth_core::constants::{APP_NAME, APP_VERSION};

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    service: &'static str,
    version: &'static str,
    model: &'static str,
    timestamp: i64,
}

pub async fn check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: APP_NAME,
        version: APP_VERSION,
        model: state.pipeline.bundle().model.kind(),
        timestamp: chrono::Utc::now().timestamp(),
    })
}

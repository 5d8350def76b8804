//! Model status handler

use axum::{extract::State, Json};
use serde::Serialize;

use airhealth_core::{ModelInfo, PipelineStats};

use crate::models::Status;
use crate::AppState;

#[derive(Serialize)]
pub struct ModelStatusResponse {
    status: Status,
    model: ModelInfo,
    stats: PipelineStats,
    advisory_labels: usize,
    notifier: &'static str,
}

pub async fn info(State(state): State<AppState>) -> Json<ModelStatusResponse> {
    Json(ModelStatusResponse {
        status: Status::Ok,
        model: state.pipeline.bundle().info(),
        stats: state.pipeline.stats(),
        advisory_labels: state.pipeline.advisory().len(),
        notifier: state.notifier.name(),
    })
}

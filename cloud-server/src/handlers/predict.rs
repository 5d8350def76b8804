//! Inference handlers

use axum::{body::Bytes, extract::State, Json};

use crate::models::Envelope;
use crate::{AppError, AppResult, AppState};

use super::{parse_record, run_pipeline};

/// Inference on the record in the request body
pub async fn predict_disease(
    State(state): State<AppState>,
    body: Bytes,
) -> AppResult<Json<Envelope>> {
    let raw = parse_record(&body);
    let output = run_pipeline(&state, raw).await?;

    Ok(Json(Envelope::from_output(output)))
}

/// Inference on the latest stored snapshot
pub async fn predict_from_cloud(State(state): State<AppState>) -> AppResult<Json<Envelope>> {
    let source = state.snapshot_source.clone();
    let latest = tokio::task::spawn_blocking(move || source.latest())
        .await??
        .ok_or_else(|| AppError::NotFound("No sensor data found.".to_string()))?;

    tracing::debug!("Latest snapshot has {} keys", latest.len());

    let output = run_pipeline(&state, latest.clone()).await?;

    Ok(Json(Envelope::from_output(output).with_latest_data(latest)))
}

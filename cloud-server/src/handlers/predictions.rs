//! Stored prediction read-back

use axum::{
    extract::{Path, State},
    Json,
};

use crate::models::Envelope;
use crate::{AppError, AppResult, AppState};

pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> AppResult<Json<Envelope>> {
    let sink = state.records.clone();
    let record = tokio::task::spawn_blocking(move || sink.fetch(&id))
        .await??
        .ok_or_else(|| AppError::NotFound("Prediction record not found.".to_string()))?;

    Ok(Json(Envelope::ok().with_record(record)))
}

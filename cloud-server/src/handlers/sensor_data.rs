//! Sensor snapshot upload

use axum::{body::Bytes, extract::State, Json};

use crate::models::Envelope;
use crate::{AppResult, AppState};

use super::parse_record;

pub async fn upload(State(state): State<AppState>, body: Bytes) -> AppResult<Json<Envelope>> {
    let raw = parse_record(&body);
    let sink = state.snapshot_sink.clone();
    let id = tokio::task::spawn_blocking(move || sink.push(&raw)).await??;

    tracing::debug!(document_id = %id, "Stored sensor snapshot");

    Ok(Json(Envelope::ok().with_document_id(Some(id))))
}

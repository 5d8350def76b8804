//! HTTP handlers

pub mod health;
pub mod ingest;
pub mod model;
pub mod predict;
pub mod predictions;
pub mod sensor_data;

use std::sync::Arc;

use airhealth_core::{AlertPayload, NotificationTransport, PipelineOutput, RawRecord};
use axum::body::Bytes;

use crate::{AppResult, AppState};

/// Body → raw record. Empty, malformed or non-object bodies become an
/// empty record so inference still runs on an all-zero vector.
pub fn parse_record(body: &Bytes) -> RawRecord {
    if body.iter().all(u8::is_ascii_whitespace) {
        tracing::warn!("Empty request body, using empty record");
        return RawRecord::new();
    }

    match serde_json::from_slice::<serde_json::Value>(body) {
        Ok(serde_json::Value::Object(map)) => map,
        Ok(other) => {
            tracing::warn!("Request body is not a JSON object ({}), using empty record", json_kind(&other));
            RawRecord::new()
        }
        Err(e) => {
            tracing::warn!("Invalid JSON body ({}), using empty record", e);
            RawRecord::new()
        }
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

/// Run the synchronous pipeline on the blocking pool
pub async fn run_pipeline(state: &AppState, raw: RawRecord) -> AppResult<PipelineOutput> {
    let pipeline = state.pipeline.clone();
    let output = tokio::task::spawn_blocking(move || pipeline.run(&raw)).await??;
    Ok(output)
}

/// Deliver an alert within the configured timeout. Never fails the caller.
pub async fn dispatch_alert(state: &AppState, payload: AlertPayload, recipient: Option<String>) {
    let notifier: Arc<dyn NotificationTransport> = state.notifier.clone();
    let transport = notifier.name();
    let timeout = state.config.alert_timeout();

    let task = tokio::task::spawn_blocking(move || notifier.send_payload(&payload, recipient.as_deref()));

    match tokio::time::timeout(timeout, task).await {
        Ok(Ok(Ok(()))) => tracing::info!(transport, "Alert dispatched"),
        Ok(Ok(Err(e))) => tracing::warn!(transport, error = %e, "Alert dispatch failed"),
        Ok(Err(e)) => tracing::error!(transport, error = %e, "Alert task panicked"),
        Err(_) => tracing::warn!(transport, timeout_secs = timeout.as_secs(), "Alert dispatch timed out"),
    }
}

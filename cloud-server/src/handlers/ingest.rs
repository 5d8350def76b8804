//! Device ingest handler
//!
//! Inference, then a best-effort record write, then an alert when any
//! prediction is active.

use axum::{
    body::Bytes,
    extract::{Query, State},
    Json,
};

use crate::models::{Envelope, IngestQuery, PredictionRecord};
use crate::{AppResult, AppState};

use super::{dispatch_alert, parse_record, run_pipeline};

pub async fn ingest_from_device(
    State(state): State<AppState>,
    params: Option<Query<Vec<(String, String)>>>,
    body: Bytes,
) -> AppResult<Json<Envelope>> {
    let query = match params {
        Some(Query(pairs)) => IngestQuery::from_pairs(&pairs),
        None => {
            tracing::warn!("Unreadable query string, ignoring it");
            IngestQuery::default()
        }
    };

    let raw = parse_record(&body);
    let output = run_pipeline(&state, raw).await?;

    let record = PredictionRecord {
        features: output.features.to_json_map(),
        predictions: output.predictions.clone(),
        layout_hash: output.features.schema().layout_hash(),
    };

    let mut warnings = Vec::new();
    let sink = state.records.clone();
    let document_id = match tokio::task::spawn_blocking(move || sink.write(&record)).await {
        Ok(Ok(id)) => {
            tracing::info!(document_id = %id, "Stored prediction record");
            Some(id)
        }
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "Failed to store prediction record");
            warnings.push(format!("prediction record not stored: {}", e));
            None
        }
        Err(e) => {
            tracing::error!(error = %e, "Record write task panicked");
            warnings.push("prediction record not stored".to_string());
            None
        }
    };

    if let Some(payload) = state.pipeline.alert(&output) {
        dispatch_alert(&state, payload, query.notify_to).await;
    }

    Ok(Json(
        Envelope::from_output(output)
            .with_document_id(document_id)
            .with_warnings(warnings),
    ))
}

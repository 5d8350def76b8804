//! Stored documents

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use airhealth_core::{Prediction, RawRecord};

/// Prediction result as handed to the record sink
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionRecord {
    /// Feature name → value, in schema order
    pub features: serde_json::Map<String, serde_json::Value>,
    pub predictions: Vec<Prediction>,
    pub layout_hash: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredPrediction {
    pub id: String,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub record: PredictionRecord,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredSnapshot {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub data: RawRecord,
}

/// Query of the ingest endpoint, read leniently from raw pairs
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct IngestQuery {
    pub notify_to: Option<String>,
}

impl IngestQuery {
    /// First non-empty `notify_to` wins; repeats and unknown keys are ignored
    pub fn from_pairs(pairs: &[(String, String)]) -> Self {
        let mut recipients = pairs
            .iter()
            .filter(|(key, _)| key == "notify_to")
            .map(|(_, value)| value.trim())
            .filter(|value| !value.is_empty());

        let notify_to = recipients.next().map(str::to_string);
        let ignored = recipients.count();
        if ignored > 0 {
            tracing::warn!(ignored, "Repeated notify_to in query, using the first");
        }

        Self { notify_to }
    }
}

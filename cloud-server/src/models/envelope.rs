//! Response envelope shared by every endpoint

use serde::Serialize;

use airhealth_core::{FeatureVector, PipelineOutput, Prediction, RawRecord};

use super::StoredPrediction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Ok,
    Error,
}

#[derive(Debug, Serialize)]
pub struct Envelope {
    pub status: Status,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub predictions: Option<Vec<Prediction>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub features: Option<FeatureVector>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Outer `None` omits the field; `Some(None)` reports a failed write as null
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_id: Option<Option<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_data: Option<RawRecord>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub record: Option<StoredPrediction>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl Envelope {
    fn empty(status: Status) -> Self {
        Self {
            status,
            predictions: None,
            features: None,
            message: None,
            document_id: None,
            latest_data: None,
            record: None,
            warnings: Vec::new(),
        }
    }

    pub fn ok() -> Self {
        Self::empty(Status::Ok)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::empty(Status::Error)
        }
    }

    /// Predictions and features of a pipeline run
    pub fn from_output(output: PipelineOutput) -> Self {
        Self {
            predictions: Some(output.predictions),
            features: Some(output.features),
            ..Self::ok()
        }
    }

    pub fn with_document_id(mut self, id: Option<String>) -> Self {
        self.document_id = Some(id);
        self
    }

    pub fn with_latest_data(mut self, data: RawRecord) -> Self {
        self.latest_data = Some(data);
        self
    }

    pub fn with_record(mut self, record: StoredPrediction) -> Self {
        self.record = Some(record);
        self
    }

    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings.extend(warnings);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_shape() {
        let value = serde_json::to_value(Envelope::error("No sensor data found.")).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"status": "error", "message": "No sensor data found."})
        );
    }

    #[test]
    fn test_null_document_id() {
        let value = serde_json::to_value(Envelope::ok().with_document_id(None)).unwrap();
        assert_eq!(value["status"], "ok");
        assert!(value["document_id"].is_null());
        assert!(value.as_object().unwrap().contains_key("document_id"));
        assert!(!value.as_object().unwrap().contains_key("warnings"));
    }
}

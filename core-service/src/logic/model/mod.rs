//! Model Module - Multi-Label Risk Inference
//!
//! The pipeline only sees [`RiskModel`]: a narrow capability that scores a
//! feature vector per label and optionally attributes the score back to
//! features. Backends:
//! - [`forest::ForestModel`] - native random-forest ensemble (JSON artifact)
//! - `onnx::OnnxModel` - ONNX Runtime session (feature `onnx`)

pub mod forest;
pub mod loader;
pub mod scorer;
pub mod threshold;

#[cfg(feature = "onnx")]
pub mod onnx;

use std::sync::Arc;

use serde::Serialize;

use crate::logic::explain::ExplainError;
use crate::logic::features::{FeatureSchema, FeatureVector, LayoutInfo};

// Re-export common types
pub use forest::ForestModel;
pub use loader::{load_bundle, LoadError};
pub use scorer::{score, LabelScore};
pub use threshold::{active_scores, is_active};

// ============================================================================
// ERROR HANDLING
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("feature vector has {actual} values, model expects {expected}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("model returned {actual} label outputs, expected {expected}")]
    OutputMismatch { expected: usize, actual: usize },

    #[error("probabilities not exposed by this model")]
    ProbabilityUnavailable,

    #[error("inference failed: {0}")]
    Inference(String),
}

// ============================================================================
// MODEL TRAIT
// ============================================================================

/// Capability required from any classifier backend.
///
/// Implementations are loaded once and shared read-only between requests.
pub trait RiskModel: Send + Sync {
    /// Backend name for logs and status
    fn kind(&self) -> &'static str;

    /// Binary outcome per label, in label-set order
    fn predict(&self, features: &FeatureVector) -> Result<Vec<bool>, ModelError>;

    /// Positive-class probability per label. A label without a usable
    /// probability is `None`; the vector may also be shorter than the label set.
    fn predict_probability(&self, features: &FeatureVector) -> Result<Vec<Option<f64>>, ModelError>;

    /// Signed contribution of each schema feature to the positive class.
    fn attributions(&self, _features: &FeatureVector) -> Result<Vec<f64>, ExplainError> {
        Err(ExplainError::Unsupported(self.kind()))
    }
}

// ============================================================================
// MODEL BUNDLE
// ============================================================================

/// Model plus the schema and label set it was trained with.
#[derive(Clone)]
pub struct ModelBundle {
    pub model: Arc<dyn RiskModel>,
    pub schema: FeatureSchema,
    pub labels: Vec<String>,
    pub source: String,
}

impl ModelBundle {
    pub fn new(
        model: Arc<dyn RiskModel>,
        schema: FeatureSchema,
        labels: Vec<String>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            model,
            schema,
            labels,
            source: source.into(),
        }
    }

    pub fn info(&self) -> ModelInfo {
        ModelInfo {
            kind: self.model.kind().to_string(),
            source: self.source.clone(),
            label_cols: self.labels.clone(),
            layout: self.schema.info(),
        }
    }
}

impl std::fmt::Debug for ModelBundle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelBundle")
            .field("kind", &self.model.kind())
            .field("source", &self.source)
            .field("features", &self.schema.len())
            .field("labels", &self.labels)
            .finish()
    }
}

/// Model metadata for status endpoints
#[derive(Debug, Clone, Serialize)]
pub struct ModelInfo {
    pub kind: String,
    pub source: String,
    pub label_cols: Vec<String>,
    pub layout: LayoutInfo,
}

// ============================================================================
// TEST SUPPORT
// ============================================================================

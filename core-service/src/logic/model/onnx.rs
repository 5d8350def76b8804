//! ONNX Backend - ONNX Runtime Integration
//!
//! Runs an exported multi-output classifier. Schema and labels come from a
//! `<model>.meta.json` sidecar because the graph does not carry them.
//!
//! Output convention: one int64 output holding the per-label class
//! (`label` by default), then one float output per label holding the
//! `[batch, n_classes]` probability row. No attribution support; the
//! explainer falls back for this backend.

use std::path::Path;
use std::sync::Arc;

use ndarray::Array2;
use ort::session::{builder::GraphOptimizationLevel, Session, SessionOutputs};
use ort::value::Value;
use parking_lot::Mutex;
use serde::Deserialize;

use crate::constants::POSITIVE_CLASS_INDEX;
use crate::logic::features::{FeatureSchema, FeatureVector};

use super::loader::LoadError;
use super::{ModelBundle, ModelError, RiskModel};

/// Sidecar metadata written next to the `.onnx` file
#[derive(Debug, Deserialize)]
struct OnnxMeta {
    feature_cols: Vec<String>,
    label_cols: Vec<String>,
    #[serde(default)]
    label_output: Option<String>,
    #[serde(default)]
    probability_outputs: Option<Vec<String>>,
}

pub struct OnnxModel {
    // `Session::run` needs `&mut self`
    session: Mutex<Session>,
    input_name: String,
    label_output: Option<String>,
    probability_outputs: Vec<String>,
    n_features: usize,
    n_labels: usize,
}

/// Load session + sidecar into a bundle
pub fn load_onnx_bundle(path: &Path) -> Result<ModelBundle, LoadError> {
    let meta_path = path.with_extension("meta.json");
    let meta_bytes = std::fs::read(&meta_path).map_err(|source| LoadError::Io {
        path: meta_path.display().to_string(),
        source,
    })?;
    let meta: OnnxMeta = serde_json::from_slice(&meta_bytes)?;

    let session = Session::builder()
        .map_err(|e| LoadError::Runtime(format!("Failed to create session builder: {}", e)))?
        .with_optimization_level(GraphOptimizationLevel::Level3)
        .map_err(|e| LoadError::Runtime(format!("Failed to set optimization: {}", e)))?
        .commit_from_file(path)
        .map_err(|e| LoadError::Runtime(format!("Failed to load model: {}", e)))?;

    let input_name = session
        .inputs
        .first()
        .map(|i| i.name.clone())
        .unwrap_or_else(|| "float_input".to_string());

    let output_names: Vec<String> = session.outputs.iter().map(|o| o.name.clone()).collect();

    let label_output = meta
        .label_output
        .clone()
        .or_else(|| output_names.iter().find(|n| n.contains("label")).cloned());

    let probability_outputs = meta.probability_outputs.clone().unwrap_or_else(|| {
        output_names
            .iter()
            .filter(|n| Some(*n) != label_output.as_ref())
            .cloned()
            .collect()
    });

    log::info!(
        "ONNX session ready (input: {}, label output: {:?}, {} probability outputs)",
        input_name,
        label_output,
        probability_outputs.len()
    );

    let model = OnnxModel {
        session: Mutex::new(session),
        input_name,
        label_output,
        probability_outputs,
        n_features: meta.feature_cols.len(),
        n_labels: meta.label_cols.len(),
    };

    Ok(ModelBundle::new(
        Arc::new(model),
        FeatureSchema::new(meta.feature_cols),
        meta.label_cols,
        path.display().to_string(),
    ))
}

/// Per-label outputs of one session run
struct RawOutputs {
    labels: Option<Vec<bool>>,
    probabilities: Vec<Option<f64>>,
}

impl OnnxModel {
    fn run(&self, features: &FeatureVector) -> Result<RawOutputs, ModelError> {
        if features.len() != self.n_features {
            return Err(ModelError::ShapeMismatch {
                expected: self.n_features,
                actual: features.len(),
            });
        }

        let input_array = Array2::<f32>::from_shape_vec((1, self.n_features), features.as_f32())
            .map_err(|e| ModelError::Inference(format!("Array error: {}", e)))?;

        let input_tensor = Value::from_array(input_array)
            .map_err(|e| ModelError::Inference(format!("Tensor error: {}", e)))?;

        let mut session = self.session.lock();
        let outputs = session
            .run(ort::inputs![&self.input_name => input_tensor])
            .map_err(|e| ModelError::Inference(format!("Inference failed: {}", e)))?;

        let labels = self
            .label_output
            .as_deref()
            .and_then(|name| self.extract_labels(&outputs, name));

        let probabilities = self
            .probability_outputs
            .iter()
            .map(|name| extract_positive_probability(&outputs, name))
            .collect();

        Ok(RawOutputs {
            labels,
            probabilities,
        })
    }

    fn extract_labels(&self, outputs: &SessionOutputs, name: &str) -> Option<Vec<bool>> {
        let output = outputs.get(name)?;
        match output.try_extract_tensor::<i64>() {
            Ok((_, data)) if data.len() >= self.n_labels => {
                Some(data[..self.n_labels].iter().map(|&c| c == 1).collect())
            }
            Ok(_) => None,
            Err(e) => {
                log::debug!("Label output '{}' not an int64 tensor: {}", name, e);
                None
            }
        }
    }
}

/// Column 1 of a `[batch, n_classes]` row; absent for single-class rows
fn extract_positive_probability(outputs: &SessionOutputs, name: &str) -> Option<f64> {
    let output = outputs.get(name)?;
    let (shape, data) = output.try_extract_tensor::<f32>().ok()?;
    let n_classes = shape.iter().last().copied().unwrap_or(0);

    if n_classes as usize > POSITIVE_CLASS_INDEX {
        data.get(POSITIVE_CLASS_INDEX).map(|&p| p as f64)
    } else {
        None
    }
}

impl RiskModel for OnnxModel {
    fn kind(&self) -> &'static str {
        "onnx"
    }

    fn predict(&self, features: &FeatureVector) -> Result<Vec<bool>, ModelError> {
        let raw = self.run(features)?;

        match raw.labels {
            Some(labels) => Ok(labels),
            // no label output: positive class wins the two-class arg-max
            None => Ok(raw
                .probabilities
                .iter()
                .map(|p| p.map_or(false, |p| p > 0.5))
                .collect()),
        }
    }

    fn predict_probability(&self, features: &FeatureVector) -> Result<Vec<Option<f64>>, ModelError> {
        Ok(self.run(features)?.probabilities)
    }
}

//! Model Loader
//!
//! Loads the model bundle once at process start. Format is chosen by file
//! extension: `.json` for the native forest, `.onnx` for ONNX Runtime
//! (requires the `onnx` feature and a `<model>.meta.json` sidecar).

use std::path::Path;
use std::sync::Arc;

use sha2::{Digest, Sha256};

use crate::logic::features::FeatureSchema;

use super::forest::{ForestArtifact, ForestModel};
use super::ModelBundle;

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse model artifact: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid model artifact: {0}")]
    InvalidArtifact(String),

    #[error("model checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch { expected: String, actual: String },

    #[error("unsupported model format: {0}")]
    UnsupportedFormat(String),

    #[error("runtime error: {0}")]
    Runtime(String),
}

/// Load a bundle from disk, verifying the SHA-256 pin when one is given
pub fn load_bundle(path: impl AsRef<Path>, expected_sha256: Option<&str>) -> Result<ModelBundle, LoadError> {
    let path = path.as_ref();
    log::info!("Loading model bundle from: {}", path.display());

    let bytes = std::fs::read(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })?;

    if let Some(expected) = expected_sha256 {
        verify_checksum(&bytes, expected)?;
        log::info!("Model checksum verified");
    }

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    let bundle = match extension.as_str() {
        "json" => forest_bundle(&bytes, path)?,
        "onnx" => onnx_bundle(path)?,
        other => return Err(LoadError::UnsupportedFormat(other.to_string())),
    };

    log::info!(
        "Loaded {} model with {} features, labels: {:?}",
        bundle.model.kind(),
        bundle.schema.len(),
        bundle.labels
    );

    Ok(bundle)
}

/// Build a forest bundle from artifact JSON bytes
pub fn forest_bundle(bytes: &[u8], source: &Path) -> Result<ModelBundle, LoadError> {
    let artifact: ForestArtifact = serde_json::from_slice(bytes)?;
    let model = ForestModel::from_artifact(&artifact)?;
    log::debug!("Forest has {} trees", model.tree_count());

    Ok(ModelBundle::new(
        Arc::new(model),
        FeatureSchema::new(artifact.feature_cols),
        artifact.label_cols,
        source.display().to_string(),
    ))
}

#[cfg(feature = "onnx")]
fn onnx_bundle(path: &Path) -> Result<ModelBundle, LoadError> {
    super::onnx::load_onnx_bundle(path)
}

#[cfg(not(feature = "onnx"))]
fn onnx_bundle(_path: &Path) -> Result<ModelBundle, LoadError> {
    Err(LoadError::UnsupportedFormat(
        "onnx (built without the `onnx` feature)".to_string(),
    ))
}

/// Hex SHA-256 of the artifact bytes
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

fn verify_checksum(bytes: &[u8], expected: &str) -> Result<(), LoadError> {
    let actual = sha256_hex(bytes);
    if !actual.eq_ignore_ascii_case(expected.trim()) {
        return Err(LoadError::ChecksumMismatch {
            expected: expected.to_string(),
            actual,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    const ARTIFACT: &str = r#"{
        "feature_cols": ["co2_ppm", "pm2_5_ugm3"],
        "label_cols": ["asthma"],
        "estimators": [{
            "classes": [0, 1],
            "trees": [{
                "children_left": [1, -1, -1],
                "children_right": [2, -1, -1],
                "feature": [1, -2, -2],
                "threshold": [35.0, -2.0, -2.0],
                "value": [[3, 3], [3, 0], [0, 3]]
            }]
        }]
    }"#;

    #[test]
    fn test_load_forest_bundle() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("disease_model.json");
        fs::write(&path, ARTIFACT).unwrap();

        let bundle = load_bundle(&path, None).unwrap();

        assert_eq!(bundle.model.kind(), "random_forest");
        assert_eq!(bundle.schema.names(), &["co2_ppm", "pm2_5_ugm3"]);
        assert_eq!(bundle.labels, vec!["asthma"]);
    }

    #[test]
    fn test_checksum_pin() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("disease_model.json");
        fs::write(&path, ARTIFACT).unwrap();

        let good = sha256_hex(ARTIFACT.as_bytes());
        assert!(load_bundle(&path, Some(&good.to_uppercase())).is_ok());

        let result = load_bundle(&path, Some("00ff"));
        assert!(matches!(result, Err(LoadError::ChecksumMismatch { .. })));
    }

    #[test]
    fn test_missing_file() {
        let result = load_bundle("/nonexistent/disease_model.json", None);
        assert!(matches!(result, Err(LoadError::Io { .. })));
    }

    #[test]
    fn test_unknown_extension() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("disease_model.pkl");
        fs::write(&path, b"\x80\x04").unwrap();

        let result = load_bundle(&path, None);
        assert!(matches!(result, Err(LoadError::UnsupportedFormat(_))));
    }
}

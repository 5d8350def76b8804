//! Central Configuration Constants
//!
//! Behavioral constants of the pipeline plus env helpers for the
//! collaborator defaults.

/// Probability above which a label is active even if the classifier
/// predicted the negative class. Exact, never configurable.
pub const TRIGGER_PROBABILITY: f64 = 0.3;

/// Number of reason features attached to each active prediction.
pub const REASON_FEATURE_COUNT: usize = 2;

/// Column of the positive class in a per-label probability row.
pub const POSITIVE_CLASS_INDEX: usize = 1;

/// Subject line of every composed alert
pub const ALERT_SUBJECT: &str = "Air Quality Health Risk Alert";

/// Default model artifact path
pub const DEFAULT_MODEL_PATH: &str = "disease_model.json";

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// App name
pub const APP_NAME: &str = "AirHealth";

// ============================================
// Helper functions to read from env with fallback
// ============================================

/// Get model artifact path from environment or use default
pub fn get_model_path() -> String {
    std::env::var("MODEL_PATH")
        .unwrap_or_else(|_| DEFAULT_MODEL_PATH.to_string())
}

/// Expected SHA-256 of the model artifact, if pinned
pub fn get_model_checksum() -> Option<String> {
    std::env::var("MODEL_SHA256")
        .ok()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
}

/// Optional advisory table override
pub fn get_advisory_path() -> Option<String> {
    std::env::var("ADVISORY_PATH")
        .ok()
        .filter(|s| !s.trim().is_empty())
}

//! Explain Module - Reason Features per Active Prediction
//!
//! Two paths: model attributions ranked by magnitude, or the leading schema
//! entries when the model cannot attribute.

pub mod engine;
pub mod types;

pub use engine::{explain, fallback};
pub use types::{ExplainError, ExplainMethod, Explanation};

//! Logic Module - Inference Pipeline Engines
//!
//! - `features/` - schema resolution (raw record → feature vector)
//! - `model/` - risk model backends, scorer, trigger policy
//! - `explain/` - reason features per active prediction
//! - `advisory/` - canned guidance per label
//! - `alert/` - alert composition and notification transports
//! - `pipeline` - facade wiring the above together

pub mod advisory;
pub mod alert;
pub mod explain;
pub mod features;
pub mod model;
pub mod pipeline;

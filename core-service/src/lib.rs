//! AirHealth Core - Health-Risk Inference Pipeline
//!
//! Turns raw environmental sensor readings into multi-label health-risk
//! predictions with explanations, advice and an optional alert.
//!
//! ```text
//! raw record ─► features::resolve ─► model::score ─► trigger policy
//!                                                      │
//!                      explain + advisory ◄────────────┘
//!                              │
//!                              ▼
//!                      alert::compose ─► NotificationTransport
//! ```

pub mod constants;
pub mod logic;

pub use logic::advisory::{Advisory, AdvisoryError, AdvisoryTable};
pub use logic::alert::{
    compose, AlertPayload, NotificationTransport, NotifyError, NullTransport, WebhookPlatform,
    WebhookTransport,
};
pub use logic::explain::{explain, ExplainError, ExplainMethod, Explanation};
pub use logic::features::{resolve, FeatureSchema, FeatureVector, RawRecord};
pub use logic::model::{
    load_bundle, LabelScore, LoadError, ModelBundle, ModelError, ModelInfo, RiskModel,
};
pub use logic::pipeline::{PipelineOutput, PipelineStats, Prediction, RiskPipeline};

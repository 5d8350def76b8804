//! Risk Pipeline - Resolve → Score → Trigger → Explain + Advise
//!
//! Holds the process-wide model bundle and advisory table. `run` is pure
//! apart from the counters and safe to call from many threads at once.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::logic::advisory::AdvisoryTable;
use crate::logic::alert::{compose, AlertPayload};
use crate::logic::explain::explain;
use crate::logic::features::{resolve, FeatureSchema, FeatureVector, RawRecord};
use crate::logic::model::{active_scores, score, ModelBundle, ModelError};

/// Enriched result for one active label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub label: String,
    pub predicted: bool,
    pub probability: Option<f64>,
    pub reason_features: Vec<String>,
    pub advice: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PipelineOutput {
    pub features: FeatureVector,
    pub predictions: Vec<Prediction>,
}

impl PipelineOutput {
    pub fn has_active(&self) -> bool {
        !self.predictions.is_empty()
    }
}

/// Counter snapshot for status endpoints
#[derive(Debug, Clone, Default, Serialize)]
pub struct PipelineStats {
    pub requests: u64,
    pub active_predictions: u64,
    pub explain_fallbacks: u64,
    pub avg_latency_us: u64,
}

#[derive(Default)]
struct Counters {
    requests: AtomicU64,
    active_predictions: AtomicU64,
    explain_fallbacks: AtomicU64,
    latency_sum_us: AtomicU64,
}

pub struct RiskPipeline {
    bundle: Arc<ModelBundle>,
    advisory: Arc<AdvisoryTable>,
    counters: Counters,
}

impl RiskPipeline {
    pub fn new(bundle: Arc<ModelBundle>, advisory: Arc<AdvisoryTable>) -> Self {
        Self {
            bundle,
            advisory,
            counters: Counters::default(),
        }
    }

    pub fn bundle(&self) -> &ModelBundle {
        &self.bundle
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.bundle.schema
    }

    pub fn advisory(&self) -> &AdvisoryTable {
        &self.advisory
    }

    /// Full inference over one raw record
    pub fn run(&self, raw: &RawRecord) -> Result<PipelineOutput, ModelError> {
        let start = Instant::now();
        let model = self.bundle.model.as_ref();

        let features = resolve(raw, &self.bundle.schema);
        let scores = score(&features, model, &self.bundle.labels)?;

        let mut fallbacks = 0u64;
        let predictions: Vec<Prediction> = active_scores(scores)
            .into_iter()
            .map(|s| {
                let explanation = explain(&features, model);
                if explanation.is_fallback() {
                    fallbacks += 1;
                }
                let advisory = self.advisory.advise(&s.label);

                Prediction {
                    label: s.label,
                    predicted: s.predicted,
                    probability: s.probability,
                    reason_features: explanation.features,
                    advice: advisory.advice,
                    title: advisory.title,
                }
            })
            .collect();

        let elapsed_us = start.elapsed().as_micros() as u64;
        self.counters.requests.fetch_add(1, Ordering::Relaxed);
        self.counters
            .active_predictions
            .fetch_add(predictions.len() as u64, Ordering::Relaxed);
        self.counters.explain_fallbacks.fetch_add(fallbacks, Ordering::Relaxed);
        self.counters.latency_sum_us.fetch_add(elapsed_us, Ordering::Relaxed);

        log::debug!(
            "Pipeline run: {} active of {} labels in {}us",
            predictions.len(),
            self.bundle.labels.len(),
            elapsed_us
        );

        Ok(PipelineOutput {
            features,
            predictions,
        })
    }

    /// Alert for the output's active predictions, if any
    pub fn alert(&self, output: &PipelineOutput) -> Option<AlertPayload> {
        compose(&output.predictions, &output.features)
    }

    pub fn stats(&self) -> PipelineStats {
        let requests = self.counters.requests.load(Ordering::Relaxed);
        let latency_sum = self.counters.latency_sum_us.load(Ordering::Relaxed);

        PipelineStats {
            requests,
            active_predictions: self.counters.active_predictions.load(Ordering::Relaxed),
            explain_fallbacks: self.counters.explain_fallbacks.load(Ordering::Relaxed),
            avg_latency_us: if requests > 0 { latency_sum / requests } else { 0 },
        }
    }
}

impl std::fmt::Debug for RiskPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RiskPipeline")
            .field("bundle", &self.bundle)
            .field("advisory_labels", &self.advisory.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::model::loader::forest_bundle;
    use crate::logic::model::stub::{bundle, StubModel};
    use serde_json::json;

    const FEATURES: [&str; 3] = ["temperature_c", "co2_ppm", "pm2_5_ugm3"];
    const LABELS: [&str; 3] = ["asthma", "copd", "mystery"];

    fn pipeline(model: StubModel) -> RiskPipeline {
        RiskPipeline::new(
            Arc::new(bundle(&FEATURES, &LABELS, model)),
            Arc::new(AdvisoryTable::builtin()),
        )
    }

    fn record() -> RawRecord {
        json!({"temperature": 35, "co2_ppm": 1200, "pm25": 80})
            .as_object()
            .cloned()
            .unwrap()
    }

    #[test]
    fn test_trigger_law_and_enrichment() {
        let p = pipeline(StubModel {
            predictions: vec![false, true, false],
            probabilities: Some(vec![Some(0.31), Some(0.9), Some(0.3)]),
            attributions: Some(vec![0.0, 0.2, 0.5]),
        });

        let output = p.run(&record()).unwrap();
        assert_eq!(output.features.as_slice(), &[35.0, 1200.0, 80.0]);

        let labels: Vec<&str> = output.predictions.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, vec!["asthma", "copd"]);

        let asthma = &output.predictions[0];
        assert!(!asthma.predicted);
        assert_eq!(asthma.probability, Some(0.31));
        assert_eq!(asthma.reason_features, vec!["pm2_5_ugm3", "co2_ppm"]);
        assert_eq!(asthma.title.as_deref(), Some("Asthma exacerbation risk"));
        assert_eq!(asthma.advice.len(), 3);
    }

    #[test]
    fn test_unknown_label_and_fallback() {
        let p = pipeline(StubModel {
            predictions: vec![false, false, true],
            probabilities: None,
            attributions: None,
        });

        let output = p.run(&record()).unwrap();
        assert_eq!(output.predictions.len(), 1);

        let mystery = &output.predictions[0];
        assert_eq!(mystery.probability, None);
        assert_eq!(mystery.title, None);
        assert!(mystery.advice.is_empty());
        assert_eq!(mystery.reason_features, vec!["temperature_c", "co2_ppm"]);

        let stats = p.stats();
        assert_eq!(stats.requests, 1);
        assert_eq!(stats.active_predictions, 1);
        assert_eq!(stats.explain_fallbacks, 1);
    }

    #[test]
    fn test_alert_only_when_active() {
        let quiet = pipeline(StubModel {
            predictions: vec![false, false, false],
            probabilities: Some(vec![Some(0.1), Some(0.2), Some(0.3)]),
            attributions: None,
        });
        let output = quiet.run(&RawRecord::new()).unwrap();
        assert!(!output.has_active());
        assert_eq!(output.features.as_slice(), &[0.0, 0.0, 0.0]);
        assert!(quiet.alert(&output).is_none());

        let loud = pipeline(StubModel {
            predictions: vec![true, false, false],
            probabilities: Some(vec![Some(0.2567)]),
            attributions: None,
        });
        let alert = loud.alert(&loud.run(&record()).unwrap()).unwrap();
        assert!(alert.body.contains("- asthma (probability: 0.26)"));
        assert!(alert.body.ends_with("pm2_5_ugm3: 80.0"));
    }

    #[test]
    fn test_short_prediction_output_errors() {
        let p = pipeline(StubModel {
            predictions: vec![true],
            probabilities: None,
            attributions: None,
        });
        assert!(matches!(p.run(&record()), Err(ModelError::OutputMismatch { .. })));
    }

    /// asthma: pm stump (strong) + co2 stump (weak); copd: temperature stump
    const FOREST: &str = r#"{
        "feature_cols": ["temperature_c", "co2_ppm", "pm2_5_ugm3"],
        "label_cols": ["asthma", "copd"],
        "estimators": [
            {"classes": [0, 1], "trees": [
                {"children_left": [1, -1, -1], "children_right": [2, -1, -1],
                 "feature": [2, -2, -2], "threshold": [35.0, -2.0, -2.0],
                 "value": [[5, 5], [5, 0], [0, 5]]},
                {"children_left": [1, -1, -1], "children_right": [2, -1, -1],
                 "feature": [1, -2, -2], "threshold": [1000.0, -2.0, -2.0],
                 "value": [[6, 4], [6, 0], [2, 2]]}
            ]},
            {"classes": [0, 1], "trees": [
                {"children_left": [1, -1, -1], "children_right": [2, -1, -1],
                 "feature": [0, -2, -2], "threshold": [40.0, -2.0, -2.0],
                 "value": [[5, 5], [5, 0], [0, 5]]}
            ]}
        ]
    }"#;

    #[test]
    fn test_forest_attributions_drive_reason_features() {
        let bundle = forest_bundle(FOREST.as_bytes(), std::path::Path::new("<forest>")).unwrap();
        let p = RiskPipeline::new(Arc::new(bundle), Arc::new(AdvisoryTable::builtin()));

        let output = p.run(&record()).unwrap();
        assert_eq!(output.predictions.len(), 1);

        let asthma = &output.predictions[0];
        assert_eq!(asthma.label, "asthma");
        assert!(asthma.predicted);
        assert_eq!(asthma.probability, Some(0.75));
        // ranked by contribution, not schema order
        assert_eq!(asthma.reason_features, vec!["pm2_5_ugm3", "co2_ppm"]);
        assert_eq!(p.stats().explain_fallbacks, 0);
    }

    #[test]
    fn test_prediction_serialization() {
        let prediction = Prediction {
            label: "mystery".to_string(),
            predicted: true,
            probability: None,
            reason_features: vec!["co2_ppm".to_string()],
            advice: vec![],
            title: None,
        };

        let value = serde_json::to_value(&prediction).unwrap();
        assert_eq!(value["probability"], serde_json::Value::Null);
        assert!(value.get("title").is_none());
    }
}

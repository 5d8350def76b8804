//! Risk Scorer
//!
//! Runs the model once over a feature vector and pairs the binary outcome
//! of each label with its probability. Missing probabilities are tolerated.

use serde::Serialize;

use crate::logic::features::FeatureVector;

use super::{ModelError, RiskModel};

/// Raw per-label result, before the trigger policy
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelScore {
    pub label: String,
    pub predicted: bool,
    pub probability: Option<f64>,
}

/// Score every label of the set, in label order
pub fn score(
    features: &FeatureVector,
    model: &dyn RiskModel,
    labels: &[String],
) -> Result<Vec<LabelScore>, ModelError> {
    let predictions = model.predict(features)?;
    if predictions.len() < labels.len() {
        return Err(ModelError::OutputMismatch {
            expected: labels.len(),
            actual: predictions.len(),
        });
    }

    let probabilities = match model.predict_probability(features) {
        Ok(p) => p,
        Err(e) => {
            log::debug!("Probabilities unavailable ({}), scoring on predictions only", e);
            Vec::new()
        }
    };

    let scores = labels
        .iter()
        .enumerate()
        .map(|(i, label)| LabelScore {
            label: label.clone(),
            predicted: predictions[i],
            probability: probabilities
                .get(i)
                .copied()
                .flatten()
                .filter(|p| p.is_finite()),
        })
        .collect();

    Ok(scores)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::features::FeatureSchema;
    use crate::logic::model::stub::StubModel;

    fn labels() -> Vec<String> {
        vec!["asthma".into(), "copd".into(), "cardio".into()]
    }

    fn vector() -> FeatureVector {
        FeatureVector::zeroed(&FeatureSchema::new(["co2_ppm"]))
    }

    #[test]
    fn test_pairs_by_position() {
        let model = StubModel {
            predictions: vec![true, false, false],
            probabilities: Some(vec![Some(0.8), Some(0.4), Some(0.1)]),
            attributions: None,
        };

        let scores = score(&vector(), &model, &labels()).unwrap();

        assert_eq!(scores.len(), 3);
        assert_eq!(scores[1].label, "copd");
        assert!(!scores[1].predicted);
        assert_eq!(scores[1].probability, Some(0.4));
    }

    #[test]
    fn test_missing_probabilities_are_absent() {
        let model = StubModel {
            predictions: vec![false, true, false],
            probabilities: None,
            attributions: None,
        };

        let scores = score(&vector(), &model, &labels()).unwrap();
        assert!(scores.iter().all(|s| s.probability.is_none()));
        assert!(scores[1].predicted);
    }

    #[test]
    fn test_partial_probabilities() {
        let model = StubModel {
            predictions: vec![false, false, false],
            probabilities: Some(vec![Some(0.5), None]),
            attributions: None,
        };

        let scores = score(&vector(), &model, &labels()).unwrap();
        assert_eq!(scores[0].probability, Some(0.5));
        assert_eq!(scores[1].probability, None);
        assert_eq!(scores[2].probability, None);
    }

    #[test]
    fn test_short_prediction_output_is_error() {
        let model = StubModel {
            predictions: vec![true],
            probabilities: None,
            attributions: None,
        };

        let result = score(&vector(), &model, &labels());
        assert!(matches!(result, Err(ModelError::OutputMismatch { expected: 3, actual: 1 })));
    }
}

//! Explain Engine - attribution ranking with schema-order fallback

use super::types::{ExplainError, ExplainMethod, Explanation};
use crate::constants::REASON_FEATURE_COUNT;
use crate::logic::features::{FeatureSchema, FeatureVector};
use crate::logic::model::RiskModel;

/// Top contributing features for the vector, attribution first.
///
/// Never fails: any attribution error degrades to the leading schema names.
pub fn explain(features: &FeatureVector, model: &dyn RiskModel) -> Explanation {
    match ranked_by_attribution(features, model) {
        Ok(names) => Explanation {
            features: names,
            method: ExplainMethod::Attribution,
        },
        Err(e) => {
            log::debug!("Explain fallback ({}): {}", model.kind(), e);
            fallback(features.schema())
        }
    }
}

/// First schema entries, in schema order
pub fn fallback(schema: &FeatureSchema) -> Explanation {
    Explanation {
        features: schema
            .names()
            .iter()
            .take(REASON_FEATURE_COUNT)
            .cloned()
            .collect(),
        method: ExplainMethod::Fallback,
    }
}

fn ranked_by_attribution(
    features: &FeatureVector,
    model: &dyn RiskModel,
) -> Result<Vec<String>, ExplainError> {
    let scores = model.attributions(features)?;
    let schema = features.schema();

    if scores.len() != schema.len() {
        return Err(ExplainError::Shape {
            expected: schema.len(),
            actual: scores.len(),
        });
    }
    if scores.iter().any(|s| !s.is_finite()) {
        return Err(ExplainError::Numerical);
    }

    let mut order: Vec<usize> = (0..scores.len()).collect();
    // stable sort keeps schema order on equal magnitude
    order.sort_by(|&a, &b| scores[b].abs().total_cmp(&scores[a].abs()));

    Ok(order
        .into_iter()
        .take(REASON_FEATURE_COUNT)
        .map(|i| schema.names()[i].clone())
        .collect())
}

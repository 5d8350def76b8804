//! Trigger Policy
//!
//! Decides which label results are reported for a request. A label is
//! active when the classifier predicts it, or when its positive-class
//! probability is strictly above [`TRIGGER_PROBABILITY`] (0.3).

use crate::constants::TRIGGER_PROBABILITY;

use super::scorer::LabelScore;

/// Trigger law for a single label result
pub fn is_active(score: &LabelScore) -> bool {
    score.predicted || score.probability.map_or(false, |p| p > TRIGGER_PROBABILITY)
}

/// Keep only active results, preserving label order
pub fn active_scores(scores: Vec<LabelScore>) -> Vec<LabelScore> {
    scores.into_iter().filter(is_active).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn score(predicted: bool, probability: Option<f64>) -> LabelScore {
        LabelScore {
            label: "asthma".to_string(),
            predicted,
            probability,
        }
    }

    #[test]
    fn test_threshold_constant() {
        assert_eq!(TRIGGER_PROBABILITY, 0.3);
    }

    #[test]
    fn test_trigger_law() {
        assert!(is_active(&score(true, None)));
        assert!(is_active(&score(true, Some(0.0))));
        assert!(is_active(&score(false, Some(0.31))));
        assert!(!is_active(&score(false, Some(0.3))));
        assert!(!is_active(&score(false, Some(0.1))));
        assert!(!is_active(&score(false, None)));
    }

    #[test]
    fn test_active_scores_keeps_order() {
        let scores = vec![
            LabelScore { label: "a".into(), predicted: false, probability: Some(0.9) },
            LabelScore { label: "b".into(), predicted: false, probability: Some(0.2) },
            LabelScore { label: "c".into(), predicted: true, probability: None },
        ];

        let active: Vec<String> = active_scores(scores).into_iter().map(|s| s.label).collect();
        assert_eq!(active, vec!["a", "c"]);
    }
}

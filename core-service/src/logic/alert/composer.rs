//! Alert Composer - one notification body for all active predictions

use crate::constants::ALERT_SUBJECT;
use crate::logic::features::{format_value, FeatureVector};
use crate::logic::pipeline::Prediction;

use super::types::AlertPayload;

const BODY_HEADER: &str = "The air-quality ML model detected potential health risks:";

/// One alert for all active predictions; nothing to say for an empty list.
pub fn compose(predictions: &[Prediction], features: &FeatureVector) -> Option<AlertPayload> {
    if predictions.is_empty() {
        return None;
    }

    let risk_lines: Vec<String> = predictions
        .iter()
        .map(|p| format!("- {} (probability: {})", p.label, format_probability(p.probability)))
        .collect();

    let feature_lines: Vec<String> = features
        .iter()
        .map(|(name, value)| format!("{}: {}", name, format_value(value)))
        .collect();

    let body = format!(
        "{}\n\n{}\n\nFeatures:\n{}",
        BODY_HEADER,
        risk_lines.join("\n"),
        feature_lines.join("\n")
    );

    Some(AlertPayload {
        subject: ALERT_SUBJECT.to_string(),
        body,
    })
}

/// Two decimals, or `N/A` when the model gave no probability
pub fn format_probability(probability: Option<f64>) -> String {
    match probability {
        Some(p) => format!("{:.2}", p),
        None => "N/A".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::features::FeatureSchema;

    fn prediction(label: &str, probability: Option<f64>) -> Prediction {
        Prediction {
            label: label.to_string(),
            predicted: true,
            probability,
            reason_features: vec![],
            advice: vec![],
            title: None,
        }
    }

    fn features() -> FeatureVector {
        let schema = FeatureSchema::new(["temperature_c", "co2_ppm", "pm2_5_ugm3"]);
        FeatureVector::from_values(&schema, vec![35.0, 1200.0, 80.25])
    }

    #[test]
    fn test_empty_is_none() {
        assert!(compose(&[], &features()).is_none());
    }

    #[test]
    fn test_probability_format() {
        assert_eq!(format_probability(Some(0.2567)), "0.26");
        assert_eq!(format_probability(Some(1.0)), "1.00");
        assert_eq!(format_probability(None), "N/A");
    }

    #[test]
    fn test_body_layout() {
        let payload = compose(
            &[prediction("asthma", Some(0.2567)), prediction("copd", None)],
            &features(),
        )
        .unwrap();

        assert_eq!(payload.subject, "Air Quality Health Risk Alert");
        assert_eq!(
            payload.body,
            "The air-quality ML model detected potential health risks:\n\n\
             - asthma (probability: 0.26)\n\
             - copd (probability: N/A)\n\n\
             Features:\n\
             temperature_c: 35.0\n\
             co2_ppm: 1200.0\n\
             pm2_5_ugm3: 80.25"
        );
    }
}

//! Integration Tests for Schema Resolution
//!
//! Resolver, alias table and vector layout exercised together against
//! the training schema.

#[cfg(test)]
mod integration_tests {
    use crate::logic::features::{resolve, FeatureSchema, RawRecord};
    use serde_json::{json, Value};

    fn record(value: Value) -> RawRecord {
        value.as_object().cloned().unwrap()
    }

    /// Columns of the deployed multi-label model
    fn training_schema() -> FeatureSchema {
        FeatureSchema::new([
            "co2_ppm",
            "co_ppm",
            "pm2_5_ugm3",
            "no2_ppb",
            "temperature_c",
            "humidity_pct",
            "overall_aqi",
            "pm2_5_roll_3",
            "no2_roll_3",
            "pm2_5_lag1",
            "no2_lag1",
        ])
    }

    #[test]
    fn test_direct_inference_scenario() {
        let schema = FeatureSchema::new(["temperature_c", "co2_ppm", "pm2_5_ugm3"]);
        let raw = record(json!({"temperature": 35, "co2_ppm": 1200, "pm25": 80}));

        let vector = resolve(&raw, &schema);

        assert_eq!(vector.as_slice(), &[35.0, 1200.0, 80.0]);
    }

    #[test]
    fn test_length_always_matches_schema() {
        let schema = training_schema();

        let records = [
            json!({}),
            json!({"temperature": 20}),
            json!({"unrelated": "x", "pm25": [1, 2]}),
            json!({"CO": 3, "NO2": "0.04", "AQI": 88, "Humidity": 60}),
        ];

        for raw in records {
            let vector = resolve(&record(raw), &schema);
            assert_eq!(vector.len(), schema.len());
            assert!(vector.as_slice().iter().all(|v| v.is_finite()));
        }
    }

    #[test]
    fn test_empty_record_is_all_zero() {
        let schema = training_schema();
        let vector = resolve(&RawRecord::new(), &schema);
        assert!(vector.as_slice().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_device_payload_aliases() {
        let schema = training_schema();
        let raw = record(json!({
            "temperature": 31.5,
            "humidity": 70,
            "co2_ppm": 950,
            "co_ppm": 4.2,
            "pm25": 55,
            "no2_ppm": 0.05,
            "aqi": 140
        }));

        let vector = resolve(&raw, &schema);

        assert_eq!(vector.get_by_name("temperature_c"), Some(31.5));
        assert_eq!(vector.get_by_name("humidity_pct"), Some(70.0));
        assert_eq!(vector.get_by_name("co2_ppm"), Some(950.0));
        assert_eq!(vector.get_by_name("co_ppm"), Some(4.2));
        assert_eq!(vector.get_by_name("pm2_5_ugm3"), Some(55.0));
        assert_eq!(vector.get_by_name("no2_ppb"), Some(0.05));
        assert_eq!(vector.get_by_name("overall_aqi"), Some(140.0));
        // engineered columns share the raw aliases
        assert_eq!(vector.get_by_name("pm2_5_roll_3"), Some(55.0));
        assert_eq!(vector.get_by_name("no2_lag1"), Some(0.05));
    }

    #[test]
    fn test_missing_candidates_default_to_zero() {
        let schema = training_schema();
        let raw = record(json!({"temperature": 22}));

        let vector = resolve(&raw, &schema);

        assert_eq!(vector.get_by_name("co2_ppm"), Some(0.0));
        assert_eq!(vector.get_by_name("overall_aqi"), Some(0.0));
        assert_eq!(vector.get_by_name("temperature_c"), Some(22.0));
    }
}

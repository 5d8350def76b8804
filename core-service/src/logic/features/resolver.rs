//! Schema Resolver - Raw Record → Feature Vector
//!
//! Maps an arbitrary keyed record onto the model schema. Never fails:
//! a slot whose candidates are all missing, or whose value cannot be
//! read as a number, is 0.0.

use serde_json::Value;

use super::aliases::candidate_keys;
use super::schema::FeatureSchema;
use super::vector::FeatureVector;

/// Keyed sensor reading, origin-agnostic (API body or stored snapshot)
pub type RawRecord = serde_json::Map<String, Value>;

/// Resolve a raw record against the schema
pub fn resolve(raw: &RawRecord, schema: &FeatureSchema) -> FeatureVector {
    let values = schema
        .names()
        .iter()
        .map(|name| resolve_feature(raw, name))
        .collect();

    let vector = FeatureVector::from_values(schema, values);
    log::debug!("Resolved features: {:?}", vector.as_slice());
    vector
}

/// Value for one canonical feature: first present candidate key wins
fn resolve_feature(raw: &RawRecord, feature_name: &str) -> f64 {
    candidate_keys(feature_name)
        .iter()
        .find_map(|key| raw.get(key))
        .map(coerce)
        .unwrap_or(0.0)
}

/// Numeric coercion; anything unreadable becomes 0.0
pub fn coerce(value: &Value) -> f64 {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    };

    parsed.filter(|v| v.is_finite()).unwrap_or(0.0)
}

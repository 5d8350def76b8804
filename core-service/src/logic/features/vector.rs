//! Feature Vector - Core data structure for model input
//!
//! A fully populated value row bound to the schema it was resolved
//! against. Length always equals the schema length; unresolved slots
//! hold 0.0.

use serde::ser::{Serialize, SerializeMap, Serializer};

use super::schema::FeatureSchema;

// ============================================================================
// FEATURE VECTOR
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    schema: FeatureSchema,
    values: Vec<f64>,
}

impl FeatureVector {
    /// Zeroed vector for a schema
    pub fn zeroed(schema: &FeatureSchema) -> Self {
        Self {
            schema: schema.clone(),
            values: vec![0.0; schema.len()],
        }
    }

    /// Create from raw values (truncates or pads with 0.0 if wrong size)
    pub fn from_values(schema: &FeatureSchema, values: Vec<f64>) -> Self {
        let mut values = values;
        values.resize(schema.len(), 0.0);
        Self {
            schema: schema.clone(),
            values,
        }
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied()
    }

    pub fn get_by_name(&self, name: &str) -> Option<f64> {
        self.schema.index_of(name).and_then(|i| self.get(i))
    }

    /// `(name, value)` pairs in schema order
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.schema
            .names()
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }

    /// Ordered JSON object `{name: value}`
    pub fn to_json_map(&self) -> serde_json::Map<String, serde_json::Value> {
        self.iter()
            .map(|(name, value)| (name.to_string(), serde_json::Value::from(value)))
            .collect()
    }

    pub fn as_f32(&self) -> Vec<f32> {
        self.values.iter().map(|&v| v as f32).collect()
    }
}

impl Serialize for FeatureVector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (name, value) in self.iter() {
            map.serialize_entry(name, &value)?;
        }
        map.end()
    }
}

/// Render a value the way the alert body and logs show numbers:
/// integral floats keep a trailing `.0`, magnitudes at or above 1e16 or
/// below 1e-4 switch to `1e+16` / `1e-05` notation.
pub fn format_value(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    let magnitude = value.abs();
    if magnitude != 0.0 && !(1e-4..1e16).contains(&magnitude) {
        return scientific(value);
    }

    if value.fract() == 0.0 {
        format!("{:.1}", value)
    } else {
        format!("{}", value)
    }
}

/// Shortest mantissa with a signed, two-digit exponent
fn scientific(value: f64) -> String {
    let repr = format!("{:e}", value);
    match repr.split_once('e') {
        Some((mantissa, exponent)) => {
            let exponent: i32 = exponent.parse().unwrap_or(0);
            let sign = if exponent < 0 { '-' } else { '+' };
            format!("{}e{}{:02}", mantissa, sign, exponent.abs())
        }
        None => repr,
    }
}

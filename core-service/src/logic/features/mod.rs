//! Features Module - Schema Resolution
//!
//! Turns heterogeneous sensor records into the fixed, ordered vector the
//! model was trained on.

pub mod aliases;
pub mod resolver;
pub mod schema;
pub mod vector;

#[cfg(test)]
mod tests;

// Re-export common types
pub use aliases::{candidate_keys, AliasGroup};
pub use resolver::{coerce, resolve, RawRecord};
pub use schema::{FeatureSchema, LayoutInfo};
pub use vector::{format_value, FeatureVector};

//! Feature Schema - Ordered Feature Layout
//!
//! **The schema controls the vector layout for every downstream step.**
//!
//! It is fixed when the model bundle is loaded and never changes for the
//! lifetime of the process. Every feature vector, attribution row and
//! stored record is positional against it.

use std::sync::Arc;

use crc32fast::Hasher;
use serde::{Deserialize, Serialize};

// ============================================================================
// FEATURE SCHEMA
// ============================================================================

/// Ordered canonical feature names expected by the model.
///
/// Cloning is cheap: the names are shared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureSchema {
    names: Arc<[String]>,
    hash: u32,
}

impl FeatureSchema {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Arc<[String]> = names.into_iter().map(Into::into).collect();
        let hash = compute_layout_hash(&names);
        Self { names, hash }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Get feature index by name (O(n) but features are few)
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    /// Get feature name by index
    pub fn name(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    /// CRC32 of the ordered names, used to tag records with their layout
    pub fn layout_hash(&self) -> u32 {
        self.hash
    }

    pub fn info(&self) -> LayoutInfo {
        LayoutInfo {
            hash: self.hash,
            feature_count: self.len(),
            feature_names: self.names.to_vec(),
        }
    }
}

// ============================================================================
// LAYOUT HASH
// ============================================================================

fn compute_layout_hash(names: &[String]) -> u32 {
    let mut hasher = Hasher::new();

    for name in names {
        hasher.update(name.as_bytes());
        hasher.update(&[0]); // Separator
    }

    hasher.finalize()
}

// ============================================================================
// LAYOUT INFO
// ============================================================================

/// Layout information for serialization/logging
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutInfo {
    pub hash: u32,
    pub feature_count: usize,
    pub feature_names: Vec<String>,
}

// ============================================================================
// TESTS
// ============================================================================

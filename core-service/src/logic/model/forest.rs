//! Forest Model - Native Multi-Output Random Forest
//!
//! One forest per label, trees stored in flat array form:
//! `children_left[i] == -1` marks a leaf, a split sends `x` left when
//! `x[feature[i]] <= threshold[i]`. `value[i]` holds the class
//! distribution (counts or fractions) observed at node `i`.
//!
//! Probabilities are the mean of the per-tree normalized leaf
//! distributions; the predicted class is the arg-max.

use serde::{Deserialize, Serialize};

use crate::constants::POSITIVE_CLASS_INDEX;
use crate::logic::explain::ExplainError;
use crate::logic::features::FeatureVector;

use super::loader::LoadError;
use super::{ModelError, RiskModel};

const LEAF: i64 = -1;

// ============================================================================
// ARTIFACT FORMAT
// ============================================================================

/// Serialized model bundle as written by the training job
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForestArtifact {
    pub feature_cols: Vec<String>,
    pub label_cols: Vec<String>,
    pub estimators: Vec<LabelForest>,
}

/// Forest for a single label
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelForest {
    pub classes: Vec<i64>,
    pub trees: Vec<DecisionTree>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    pub value: Vec<Vec<f64>>,
}

// ============================================================================
// DECISION TREE
// ============================================================================

impl DecisionTree {
    fn node_count(&self) -> usize {
        self.children_left.len()
    }

    fn is_leaf(&self, node: usize) -> bool {
        self.children_left[node] == LEAF
    }

    fn next(&self, node: usize, x: &[f64]) -> usize {
        let feature = self.feature[node] as usize;
        if x[feature] <= self.threshold[node] {
            self.children_left[node] as usize
        } else {
            self.children_right[node] as usize
        }
    }

    /// Node indices from root to leaf
    fn decision_path(&self, x: &[f64]) -> Vec<usize> {
        let mut path = vec![0];
        let mut node = 0;
        while !self.is_leaf(node) {
            node = self.next(node, x);
            path.push(node);
        }
        path
    }

    /// Class distribution at `node`, normalized to sum to 1
    fn distribution(&self, node: usize) -> Vec<f64> {
        let row = &self.value[node];
        let total: f64 = row.iter().sum();
        if total > 0.0 {
            row.iter().map(|v| v / total).collect()
        } else {
            vec![0.0; row.len()]
        }
    }

    fn leaf_distribution(&self, x: &[f64]) -> Vec<f64> {
        let path = self.decision_path(x);
        self.distribution(path[path.len() - 1])
    }

    /// Decision-path contributions for `class`: every split credits its
    /// feature with the change in class probability it caused.
    fn contributions(&self, x: &[f64], class: usize, out: &mut [f64]) {
        let path = self.decision_path(x);
        for pair in path.windows(2) {
            let (parent, child) = (pair[0], pair[1]);
            let feature = self.feature[parent] as usize;
            let before = self.distribution(parent)[class];
            let after = self.distribution(child)[class];
            out[feature] += after - before;
        }
    }

    fn validate(&self, n_features: usize, n_classes: usize) -> Result<(), String> {
        let n = self.node_count();
        if n == 0 {
            return Err("tree has no nodes".to_string());
        }
        if self.children_right.len() != n
            || self.feature.len() != n
            || self.threshold.len() != n
            || self.value.len() != n
        {
            return Err(format!("tree arrays differ in length (expected {})", n));
        }

        for node in 0..n {
            if self.value[node].len() != n_classes {
                return Err(format!(
                    "node {} has {} class values, expected {}",
                    node,
                    self.value[node].len(),
                    n_classes
                ));
            }

            let (left, right) = (self.children_left[node], self.children_right[node]);
            if left == LEAF {
                continue;
            }

            // children always come after their parent, so every walk terminates
            for child in [left, right] {
                if child <= node as i64 || child >= n as i64 {
                    return Err(format!("node {} has invalid child {}", node, child));
                }
            }

            let feature = self.feature[node];
            if feature < 0 || feature as usize >= n_features {
                return Err(format!("node {} splits on unknown feature {}", node, feature));
            }
        }

        Ok(())
    }
}

// ============================================================================
// LABEL FOREST
// ============================================================================

impl LabelForest {
    /// Mean class distribution over all trees
    fn predict_proba(&self, x: &[f64]) -> Vec<f64> {
        let n_classes = self.classes.len();
        let mut proba = vec![0.0; n_classes];

        for tree in &self.trees {
            for (acc, p) in proba.iter_mut().zip(tree.leaf_distribution(x)) {
                *acc += p;
            }
        }

        let n_trees = self.trees.len().max(1) as f64;
        proba.iter_mut().for_each(|p| *p /= n_trees);
        proba
    }

    /// Arg-max class (first wins on ties) equals 1
    fn predict(&self, proba: &[f64]) -> bool {
        let mut best = 0;
        for (i, p) in proba.iter().enumerate() {
            if *p > proba[best] {
                best = i;
            }
        }
        self.classes.get(best).copied() == Some(1)
    }

    /// Positive-class column, absent when the label saw a single class
    fn positive_probability(&self, proba: &[f64]) -> Option<f64> {
        if self.classes.len() > POSITIVE_CLASS_INDEX {
            proba.get(POSITIVE_CLASS_INDEX).copied()
        } else {
            None
        }
    }
}

// ============================================================================
// FOREST MODEL
// ============================================================================

#[derive(Debug, Clone)]
pub struct ForestModel {
    n_features: usize,
    estimators: Vec<LabelForest>,
}

impl ForestModel {
    /// Validate an artifact and build the model
    pub fn from_artifact(artifact: &ForestArtifact) -> Result<Self, LoadError> {
        let n_features = artifact.feature_cols.len();

        if n_features == 0 {
            return Err(LoadError::InvalidArtifact("no feature columns".to_string()));
        }
        if artifact.estimators.len() != artifact.label_cols.len() {
            return Err(LoadError::InvalidArtifact(format!(
                "{} estimators for {} labels",
                artifact.estimators.len(),
                artifact.label_cols.len()
            )));
        }

        for (label, forest) in artifact.label_cols.iter().zip(&artifact.estimators) {
            if forest.classes.is_empty() {
                return Err(LoadError::InvalidArtifact(format!("label '{}' has no classes", label)));
            }
            if forest.trees.is_empty() {
                return Err(LoadError::InvalidArtifact(format!("label '{}' has no trees", label)));
            }
            for (i, tree) in forest.trees.iter().enumerate() {
                tree.validate(n_features, forest.classes.len()).map_err(|e| {
                    LoadError::InvalidArtifact(format!("label '{}' tree {}: {}", label, i, e))
                })?;
            }
        }

        Ok(Self {
            n_features,
            estimators: artifact.estimators.clone(),
        })
    }

    pub fn tree_count(&self) -> usize {
        self.estimators.iter().map(|f| f.trees.len()).sum()
    }

    fn check_shape(&self, features: &FeatureVector) -> Result<(), ModelError> {
        if features.len() != self.n_features {
            return Err(ModelError::ShapeMismatch {
                expected: self.n_features,
                actual: features.len(),
            });
        }
        Ok(())
    }
}

impl RiskModel for ForestModel {
    fn kind(&self) -> &'static str {
        "random_forest"
    }

    fn predict(&self, features: &FeatureVector) -> Result<Vec<bool>, ModelError> {
        self.check_shape(features)?;
        let x = features.as_slice();

        Ok(self
            .estimators
            .iter()
            .map(|forest| forest.predict(&forest.predict_proba(x)))
            .collect())
    }

    fn predict_probability(&self, features: &FeatureVector) -> Result<Vec<Option<f64>>, ModelError> {
        self.check_shape(features)?;
        let x = features.as_slice();

        Ok(self
            .estimators
            .iter()
            .map(|forest| forest.positive_probability(&forest.predict_proba(x)))
            .collect())
    }

    /// Contributions from the first label's forest, averaged over its trees
    fn attributions(&self, features: &FeatureVector) -> Result<Vec<f64>, ExplainError> {
        if features.len() != self.n_features {
            return Err(ExplainError::Shape {
                expected: self.n_features,
                actual: features.len(),
            });
        }

        let forest = self
            .estimators
            .first()
            .ok_or(ExplainError::Unavailable("model has no estimators"))?;

        let class = if forest.classes.len() > POSITIVE_CLASS_INDEX {
            POSITIVE_CLASS_INDEX
        } else {
            0
        };

        let x = features.as_slice();
        let mut totals = vec![0.0; self.n_features];
        for tree in &forest.trees {
            tree.contributions(x, class, &mut totals);
        }

        let n_trees = forest.trees.len() as f64;
        let mean: Vec<f64> = totals.into_iter().map(|t| t / n_trees).collect();

        if mean.iter().any(|v| !v.is_finite()) {
            return Err(ExplainError::Numerical);
        }

        Ok(mean)
    }
}

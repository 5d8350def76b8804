use serde::{Deserialize, Serialize};

/// Why the attribution path could not produce a ranking
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ExplainError {
    #[error("{0} model does not expose attributions")]
    Unsupported(&'static str),

    #[error("attribution unavailable: {0}")]
    Unavailable(&'static str),

    #[error("attribution produced non-finite values")]
    Numerical,

    #[error("attribution has {actual} values, schema has {expected}")]
    Shape { expected: usize, actual: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExplainMethod {
    Attribution,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Explanation {
    pub features: Vec<String>, // at most REASON_FEATURE_COUNT, schema names only
    pub method: ExplainMethod,
}

impl Explanation {
    pub fn is_fallback(&self) -> bool {
        self.method == ExplainMethod::Fallback
    }
}

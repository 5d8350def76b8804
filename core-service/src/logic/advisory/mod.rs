//! Advisory Module - Canned Guidance per Risk Label
//!
//! Static table, loaded once at start and read-only afterwards. The built-in
//! table can be replaced by a JSON file of the form
//! `{"<label>": {"title": "...", "advice": ["...", ...]}}`.

use std::collections::HashMap;
use std::path::Path;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Title and recommended actions for one label
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Advisory {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub advice: Vec<String>,
}

impl Advisory {
    fn new(title: &str, advice: &[&str]) -> Self {
        Self {
            title: Some(title.to_string()),
            advice: advice.iter().map(|a| a.to_string()).collect(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AdvisoryError {
    #[error("failed to read advisory file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse advisory file: {0}")]
    Parse(#[from] serde_json::Error),
}

// ============================================================================
// BUILT-IN TABLE
// ============================================================================

static BUILTIN: Lazy<HashMap<String, Advisory>> = Lazy::new(|| {
    let mut table = HashMap::new();

    table.insert(
        "asthma".to_string(),
        Advisory::new(
            "Asthma exacerbation risk",
            &[
                "Avoid outdoor strenuous exercise.",
                "Keep windows closed; increase indoor filtration if possible.",
                "Use prescribed inhaler as advised; consult physician if symptoms worsen.",
            ],
        ),
    );
    table.insert(
        "copd".to_string(),
        Advisory::new(
            "COPD exacerbation risk",
            &[
                "Avoid outdoor exposure; use face mask outdoors.",
                "Ensure medication adherence; seek medical advice for breathing difficulty.",
            ],
        ),
    );
    table.insert(
        "resp_inf".to_string(),
        Advisory::new(
            "Respiratory infection risk",
            &[
                "Reduce exposure to polluted air; maintain hydration and hygiene.",
                "If you have symptoms, consult a doctor.",
            ],
        ),
    );
    table.insert(
        "cardio".to_string(),
        Advisory::new(
            "Cardiovascular risk",
            &[
                "Avoid heavy exertion outdoors; those with heart disease should be cautious.",
                "Consult your cardiologist if you have chest pain or unusual breathlessness.",
            ],
        ),
    );
    table.insert(
        "allergy".to_string(),
        Advisory::new(
            "Allergic reaction risk",
            &[
                "Consider antihistamines if you have allergies; keep indoor air clean.",
                "Avoid outdoor activities during high pollutant episodes.",
            ],
        ),
    );

    table
});

// ============================================================================
// ADVISORY TABLE
// ============================================================================

#[derive(Debug, Clone)]
pub struct AdvisoryTable {
    entries: HashMap<String, Advisory>,
}

impl AdvisoryTable {
    /// Table shipped with the service
    pub fn builtin() -> Self {
        Self {
            entries: BUILTIN.clone(),
        }
    }

    /// Replacement table from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, AdvisoryError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| AdvisoryError::Io {
            path: path.display().to_string(),
            source,
        })?;

        let entries: HashMap<String, Advisory> = serde_json::from_str(&content)?;
        log::info!("Loaded {} advisory templates from {}", entries.len(), path.display());
        Ok(Self { entries })
    }

    /// File table when a path is configured, built-in otherwise
    pub fn load(path: Option<&str>) -> Result<Self, AdvisoryError> {
        match path {
            Some(p) => Self::from_file(p),
            None => Ok(Self::builtin()),
        }
    }

    /// Lookup never fails: unknown labels get an empty advisory
    pub fn advise(&self, label: &str) -> Advisory {
        self.entries.get(label).cloned().unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for AdvisoryTable {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_builtin_labels() {
        let table = AdvisoryTable::builtin();
        assert_eq!(table.len(), 5);

        let asthma = table.advise("asthma");
        assert_eq!(asthma.title.as_deref(), Some("Asthma exacerbation risk"));
        assert_eq!(asthma.advice.len(), 3);
        assert_eq!(asthma.advice[0], "Avoid outdoor strenuous exercise.");

        let copd = table.advise("copd");
        assert_eq!(copd.advice.len(), 2);
    }

    #[test]
    fn test_unknown_label() {
        let advisory = AdvisoryTable::builtin().advise("unknown_label");
        assert_eq!(advisory.title, None);
        assert!(advisory.advice.is_empty());
    }

    #[test]
    fn test_file_override() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("advisory.json");
        fs::write(
            &path,
            r#"{"asthma": {"title": "Custom", "advice": ["Stay in."]}, "cardio": {"advice": []}}"#,
        )
        .unwrap();

        let table = AdvisoryTable::from_file(&path).unwrap();
        assert_eq!(table.advise("asthma").advice, vec!["Stay in."]);
        assert_eq!(table.advise("cardio").title, None);
        // override replaces the whole table
        assert!(table.advise("copd").advice.is_empty());
    }

    #[test]
    fn test_bad_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("advisory.json");
        fs::write(&path, "[1, 2]").unwrap();

        assert!(matches!(AdvisoryTable::from_file(&path), Err(AdvisoryError::Parse(_))));
        assert!(matches!(
            AdvisoryTable::load(Some("/nonexistent/advisory.json")),
            Err(AdvisoryError::Io { .. })
        ));
    }
}

//! Alias Table - Sensor Key Aliases
//!
//! Devices and stored snapshots name the same reading differently
//! (`temperature`, `temp`, `Temperature`...). Each canonical feature name
//! falls into at most one alias group; groups are tried in the order of
//! [`ALIAS_TABLE`] and the first match wins.

// ============================================================================
// ALIAS GROUPS
// ============================================================================

/// Sensor family a canonical feature name belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AliasGroup {
    Temperature,
    Humidity,
    Co2,
    CarbonMonoxide,
    Particulate,
    No2,
    Aqi,
}

/// How a lower-cased canonical name selects a group
struct AliasRule {
    group: AliasGroup,
    contains: &'static str,
    excludes: Option<&'static str>,
    candidates: &'static [&'static str],
}

/// Priority-ordered alias rules. Order matters: `co2` must be tested
/// before the bare `co` rule, `temp` before everything else.
const ALIAS_TABLE: &[AliasRule] = &[
    AliasRule {
        group: AliasGroup::Temperature,
        contains: "temp",
        excludes: None,
        candidates: &["temperature", "temp", "Temperature"],
    },
    AliasRule {
        group: AliasGroup::Humidity,
        contains: "humid",
        excludes: None,
        candidates: &["humidity", "hum", "Humidity"],
    },
    AliasRule {
        group: AliasGroup::Co2,
        contains: "co2",
        excludes: None,
        candidates: &["co2_ppm", "co2", "CO2"],
    },
    AliasRule {
        group: AliasGroup::CarbonMonoxide,
        contains: "co",
        excludes: Some("co2"),
        candidates: &["co_ppm", "co", "CO_ppm", "CO"],
    },
    AliasRule {
        group: AliasGroup::Particulate,
        contains: "pm",
        excludes: None,
        candidates: &["pm25", "pm_25", "PM2_5"],
    },
    AliasRule {
        group: AliasGroup::No2,
        contains: "no2",
        excludes: None,
        candidates: &["no2_ppm", "no2", "NO2"],
    },
    AliasRule {
        group: AliasGroup::Aqi,
        contains: "aqi",
        excludes: None,
        candidates: &["aqi", "AQI"],
    },
];

impl AliasRule {
    fn matches(&self, lowered: &str) -> bool {
        lowered.contains(self.contains)
            && self.excludes.map_or(true, |ex| !lowered.contains(ex))
    }
}

impl AliasGroup {
    /// Classify a canonical feature name, `None` if no sensor family matches
    pub fn classify(feature_name: &str) -> Option<AliasGroup> {
        let lowered = feature_name.to_lowercase();
        ALIAS_TABLE
            .iter()
            .find(|rule| rule.matches(&lowered))
            .map(|rule| rule.group)
    }

    /// Alias keys of this group, in lookup order
    pub fn candidates(self) -> &'static [&'static str] {
        ALIAS_TABLE
            .iter()
            .find(|rule| rule.group == self)
            .map(|rule| rule.candidates)
            .unwrap_or(&[])
    }
}

/// Full ordered list of raw-record keys to try for a canonical name:
/// the name itself, its lower-cased form, then the group aliases.
pub fn candidate_keys(feature_name: &str) -> Vec<String> {
    let mut keys = vec![feature_name.to_string(), feature_name.to_lowercase()];

    if let Some(group) = AliasGroup::classify(feature_name) {
        keys.extend(group.candidates().iter().map(|k| k.to_string()));
    }

    keys
}

//! Monitoring feature names and the ordered feature set.

use std::fmt;
use std::str::FromStr;
use serde::{Deserialize, Serialize};

/// A named, independently toggleable monitoring capability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Feature {
    #[serde(rename = "acm-alerting")]
    AcmAlerting,
    #[serde(rename = "perses-dashboards")]
    PersesDashboards,
    #[serde(rename = "incidents")]
    Incidents,
}

impl Feature {
    /// All features in argument order
    pub const ALL: [Feature; 3] = [
        Feature::AcmAlerting,
        Feature::PersesDashboards,
        Feature::Incidents,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Feature::AcmAlerting => "acm-alerting",
            Feature::PersesDashboards => "perses-dashboards",
            Feature::Incidents => "incidents",
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Feature {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "acm-alerting" => Ok(Feature::AcmAlerting),
            "perses-dashboards" => Ok(Feature::PersesDashboards),
            "incidents" => Ok(Feature::Incidents),
            other => Err(format!(
                "Invalid feature: {}. Valid options: acm-alerting, perses-dashboards, incidents",
                other
            )),
        }
    }
}

/// Ordered, duplicate-free set of features.
///
/// Membership is what matters for activation; insertion order is kept so the
/// `-features=` argument serializes the same way on every pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureSet {
    features: Vec<Feature>,
}

impl FeatureSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a feature, returning false if it was already present
    pub fn insert(&mut self, feature: Feature) -> bool {
        if self.contains(feature) {
            return false;
        }
        self.features.push(feature);
        true
    }

    pub fn contains(&self, feature: Feature) -> bool {
        self.features.contains(&feature)
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = Feature> + '_ {
        self.features.iter().copied()
    }

    /// Comma-separated feature names in insertion order
    pub fn joined(&self) -> String {
        self.features
            .iter()
            .map(Feature::as_str)
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Parse a comma-separated list, ignoring blanks and duplicates
    pub fn parse_list(list: &str) -> Result<Self, String> {
        list.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(Feature::from_str)
            .collect()
    }
}

impl FromIterator<Feature> for FeatureSet {
    fn from_iter<I: IntoIterator<Item = Feature>>(iter: I) -> Self {
        let mut set = FeatureSet::new();
        for feature in iter {
            set.insert(feature);
        }
        set
    }
}

impl fmt::Display for FeatureSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.joined())
    }
}

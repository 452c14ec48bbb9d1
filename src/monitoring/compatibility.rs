//! Version Compatibility Gate
//!
//! Semantic version checks for external dependencies, and the compatibility
//! matrix mapping platform versions to the features they support.

use log::{debug, warn};
use semver::Version;
use serde::{Deserialize, Serialize};

use super::features::{Feature, FeatureSet};

/// Oldest ACM release that ships the alerting endpoints the plugin proxies to
pub const DEFAULT_MIN_ACM_VERSION: &str = "2.11";

/// Parse a loosely formatted version string.
///
/// Accepts an optional leading `v` and one to three numeric components;
/// pre-release and build suffixes are dropped before comparison.
pub fn parse_version(raw: &str) -> Option<Version> {
    let trimmed = raw.trim();
    let trimmed = trimmed
        .strip_prefix('v')
        .or_else(|| trimmed.strip_prefix('V'))
        .unwrap_or(trimmed);
    let core = trimmed.split(['-', '+']).next().unwrap_or_default();
    if core.is_empty() {
        return None;
    }

    let mut parts: Vec<&str> = core.split('.').collect();
    if parts.len() > 3 {
        return None;
    }
    while parts.len() < 3 {
        parts.push("0");
    }

    Version::parse(&parts.join(".")).ok()
}

/// True iff `actual >= min`. Unparseable input on either side is incompatible.
pub fn is_compatible(actual: &str, min: &str) -> bool {
    match (parse_version(actual), parse_version(min)) {
        (Some(actual_version), Some(min_version)) => actual_version >= min_version,
        (None, _) => {
            warn!("Unable to parse dependency version '{}', treating as incompatible", actual);
            false
        }
        (_, None) => {
            warn!("Unable to parse minimum version '{}', treating as incompatible", min);
            false
        }
    }
}

/// Minimum-version check for one external dependency
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyGate {
    dependency: String,
    min_version: String,
}

impl DependencyGate {
    pub fn new(dependency: impl Into<String>, min_version: impl Into<String>) -> Self {
        Self {
            dependency: dependency.into(),
            min_version: min_version.into(),
        }
    }

    /// Gate for the ACM alerting backend
    pub fn acm() -> Self {
        Self::new("acm", DEFAULT_MIN_ACM_VERSION)
    }

    pub fn min_version(&self) -> &str {
        &self.min_version
    }

    /// Check the version reported by the dependency; a missing version fails
    pub fn allows(&self, reported: Option<&str>) -> bool {
        let allowed = match reported {
            Some(version) => is_compatible(version, &self.min_version),
            None => false,
        };
        debug!(
            "{} version {:?} against minimum {}: {}",
            self.dependency,
            reported,
            self.min_version,
            if allowed { "compatible" } else { "incompatible" }
        );
        allowed
    }
}

impl Default for DependencyGate {
    fn default() -> Self {
        Self::acm()
    }
}

/// Features available from a platform version onwards
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompatibilityEntry {
    pub min_cluster_version: String,
    /// Exclusive upper bound
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_cluster_version: Option<String>,
    pub features: FeatureSet,
}

impl CompatibilityEntry {
    fn matches(&self, cluster: &Version) -> bool {
        let above_min = parse_version(&self.min_cluster_version)
            .map(|min| *cluster >= min)
            .unwrap_or(false);
        let below_max = match &self.max_cluster_version {
            Some(max) => parse_version(max).map(|max| *cluster < max).unwrap_or(false),
            None => true,
        };
        above_min && below_max
    }
}

/// Ordered table of platform version ranges; the first matching entry wins
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompatibilityMatrix {
    entries: Vec<CompatibilityEntry>,
}

impl CompatibilityMatrix {
    pub fn new(entries: Vec<CompatibilityEntry>) -> Self {
        Self { entries }
    }

    /// Built-in table for the monitoring console plugin
    pub fn monitoring() -> Self {
        Self::new(vec![
            CompatibilityEntry {
                min_cluster_version: "4.14".to_string(),
                max_cluster_version: Some("4.19".to_string()),
                features: [Feature::AcmAlerting].into_iter().collect(),
            },
            CompatibilityEntry {
                min_cluster_version: "4.19".to_string(),
                max_cluster_version: None,
                features: Feature::ALL.into_iter().collect(),
            },
        ])
    }

    pub fn lookup(&self, cluster_version: &str) -> Option<&CompatibilityEntry> {
        let Some(cluster) = parse_version(cluster_version) else {
            warn!("Unable to parse cluster version '{}'", cluster_version);
            return None;
        };
        self.entries.iter().find(|entry| entry.matches(&cluster))
    }

    /// Supported features for a platform version, empty when unsupported
    pub fn features_for(&self, cluster_version: &str) -> FeatureSet {
        match self.lookup(cluster_version) {
            Some(entry) => entry.features.clone(),
            None => {
                debug!("No compatibility entry for cluster version {}", cluster_version);
                FeatureSet::new()
            }
        }
    }
}

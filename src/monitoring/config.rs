//! UIPlugin Monitoring Configuration
//!
//! Input documents as persisted in the UIPlugin resource, and the normalized
//! per-invocation view the validator and resolver work on.
//!
//! Two schema generations exist. The current one carries an explicit
//! `enabled` flag per sub-configuration; the older one only has the fields,
//! and a populated field means the feature was asked for. Both collapse into
//! [`Intent`] in [`MonitoringConfiguration::normalize`] so nothing downstream
//! needs to know which generation it was given.

use serde::{Deserialize, Serialize};

/// UIPlugin custom resource (only the parts the resolver reads)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UIPlugin {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default)]
    pub metadata: PluginMetadata,
    pub spec: UIPluginSpec,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PluginMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UIPluginSpec {
    #[serde(rename = "type")]
    pub plugin_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monitoring: Option<MonitoringConfiguration>,
}

/// `spec.monitoring` of a UIPlugin
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitoringConfiguration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acm: Option<AlertingReference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub perses: Option<DashboardReference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub incidents: Option<IncidentsReference>,

    /// Pre-`acm` location of the alertmanager URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alertmanager: Option<UrlReference>,
    /// Pre-`acm` location of the thanos querier URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thanos_querier: Option<UrlReference>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertingReference {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default)]
    pub alertmanager: UrlReference,
    #[serde(default)]
    pub thanos_querier: UrlReference,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlReference {
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardReference {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub namespace: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncidentsReference {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

/// Operator-level defaults supplied by the caller for one pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolverDefaults {
    pub dashboard_name: Option<String>,
    pub dashboard_namespace: Option<String>,
}

/// Whether the user asked for a feature
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    /// The document carries an `enabled` flag
    Explicit { enabled: bool },
    /// No flag; any populated field counts as a request
    LegacyImplicit { populated: bool },
}

impl Intent {
    pub fn from_flag(enabled: Option<bool>, populated: bool) -> Self {
        match enabled {
            Some(enabled) => Intent::Explicit { enabled },
            None => Intent::LegacyImplicit { populated },
        }
    }

    pub fn requested(&self) -> bool {
        match *self {
            Intent::Explicit { enabled } => enabled,
            Intent::LegacyImplicit { populated } => populated,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertingConfig {
    pub intent: Intent,
    pub alertmanager_url: String,
    pub thanos_querier_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardConfig {
    pub intent: Intent,
    pub name: String,
    pub namespace: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncidentsConfig {
    pub intent: Intent,
}

/// Monitoring configuration after schema normalization and defaulting.
///
/// Built fresh for every pass; the source document is never modified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedMonitoring {
    pub alerting: AlertingConfig,
    pub dashboard: DashboardConfig,
    pub incidents: IncidentsConfig,
}

impl NormalizedMonitoring {
    /// True if at least one sub-feature was requested
    pub fn any_requested(&self) -> bool {
        self.alerting.intent.requested()
            || self.dashboard.intent.requested()
            || self.incidents.intent.requested()
    }
}

fn first_non_empty(primary: Option<&str>, fallback: Option<&str>) -> String {
    primary
        .filter(|s| !s.is_empty())
        .or(fallback.filter(|s| !s.is_empty()))
        .unwrap_or_default()
        .to_string()
}

impl MonitoringConfiguration {
    pub fn normalize(&self, defaults: &ResolverDefaults) -> NormalizedMonitoring {
        NormalizedMonitoring {
            alerting: self.normalize_alerting(),
            dashboard: self.normalize_dashboard(defaults),
            incidents: IncidentsConfig {
                intent: Intent::from_flag(
                    self.incidents.as_ref().and_then(|i| i.enabled),
                    false,
                ),
            },
        }
    }

    fn normalize_alerting(&self) -> AlertingConfig {
        let acm = self.acm.as_ref();
        let alertmanager_url = first_non_empty(
            acm.map(|a| a.alertmanager.url.as_str()),
            self.alertmanager.as_ref().map(|r| r.url.as_str()),
        );
        let thanos_querier_url = first_non_empty(
            acm.map(|a| a.thanos_querier.url.as_str()),
            self.thanos_querier.as_ref().map(|r| r.url.as_str()),
        );
        let populated = !alertmanager_url.is_empty() || !thanos_querier_url.is_empty();

        AlertingConfig {
            intent: Intent::from_flag(acm.and_then(|a| a.enabled), populated),
            alertmanager_url,
            thanos_querier_url,
        }
    }

    fn normalize_dashboard(&self, defaults: &ResolverDefaults) -> DashboardConfig {
        let perses = self.perses.clone().unwrap_or_default();
        let populated = !perses.name.is_empty() || !perses.namespace.is_empty();
        let intent = Intent::from_flag(perses.enabled, populated);

        // Defaults fill gaps of a requested dashboard; they never create intent
        let (name, namespace) = if intent.requested() {
            (
                first_non_empty(
                    Some(perses.name.as_str()),
                    defaults.dashboard_name.as_deref(),
                ),
                first_non_empty(
                    Some(perses.namespace.as_str()),
                    defaults.dashboard_namespace.as_deref(),
                ),
            )
        } else {
            (perses.name, perses.namespace)
        };

        DashboardConfig { intent, name, namespace }
    }
}

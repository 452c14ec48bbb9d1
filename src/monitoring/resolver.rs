//! Feature Flag Resolver
//!
//! Merges what the user asked for, what the validator accepted, what the
//! platform supports and what the dependency gate allows into the final
//! feature set.

use log::{debug, info, warn};

use super::compatibility::DependencyGate;
use super::config::{NormalizedMonitoring, ResolverDefaults, UIPlugin};
use super::error::{ResolveError, ResolveResult};
use super::features::{Feature, FeatureSet};
use super::manifest::{self, PluginManifest, PluginTarget};
use super::service::ServiceDescriptor;
use super::validator::{self, Validation};

/// What the hosting platform offers for one pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformSupport {
    /// Features supported by the running platform version
    pub supported: FeatureSet,
    /// Version reported by the alerting dependency, if installed
    pub dependency_version: Option<String>,
    pub gate: DependencyGate,
}

impl PlatformSupport {
    pub fn new(supported: FeatureSet, dependency_version: Option<String>) -> Self {
        Self {
            supported,
            dependency_version,
            gate: DependencyGate::default(),
        }
    }

    pub fn with_gate(mut self, gate: DependencyGate) -> Self {
        self.gate = gate;
        self
    }
}

/// Decide which features become active.
///
/// A valid feature that is dropped only by the dependency gate is tolerated
/// as long as something else stays active.
pub fn resolve(
    config: &NormalizedMonitoring,
    validation: &Validation,
    platform: &PlatformSupport,
) -> ResolveResult<FeatureSet> {
    let wants_alerting = config.alerting.intent.requested();
    let wants_dashboard = config.dashboard.intent.requested();
    let wants_incidents = config.incidents.intent.requested();

    if !config.any_requested() {
        return Err(ResolveError::NoIntent);
    }

    // only requested sections count; incidents has no fields, so a request
    // for it is never incomplete
    let alerting_usable = wants_alerting && validation.alerting_valid;
    let dashboard_usable = wants_dashboard && validation.dashboard_valid;
    if !alerting_usable && !dashboard_usable && !wants_incidents {
        return Err(ResolveError::invalid_configuration(validation.diagnostic.clone()));
    }

    let mut features = FeatureSet::new();

    if alerting_usable && platform.supported.contains(Feature::AcmAlerting) {
        if platform.gate.allows(platform.dependency_version.as_deref()) {
            features.insert(Feature::AcmAlerting);
        } else {
            warn!(
                "Dropping {}: dependency version {:?} is below {}",
                Feature::AcmAlerting,
                platform.dependency_version,
                platform.gate.min_version()
            );
        }
    }

    if dashboard_usable && platform.supported.contains(Feature::PersesDashboards) {
        features.insert(Feature::PersesDashboards);
    }

    if wants_incidents && platform.supported.contains(Feature::Incidents) {
        features.insert(Feature::Incidents);
    }

    if features.is_empty() {
        // an incomplete section the platform could have run explains the failure best
        let incomplete_supported = (wants_alerting
            && !validation.alerting_valid
            && platform.supported.contains(Feature::AcmAlerting))
            || (wants_dashboard
                && !validation.dashboard_valid
                && platform.supported.contains(Feature::PersesDashboards));
        if incomplete_supported && !validation.diagnostic.is_empty() {
            return Err(ResolveError::invalid_configuration(validation.diagnostic.clone()));
        }

        let requested_supported = [
            (Feature::AcmAlerting, wants_alerting),
            (Feature::PersesDashboards, wants_dashboard),
            (Feature::Incidents, wants_incidents),
        ]
        .into_iter()
        .any(|(feature, wanted)| wanted && platform.supported.contains(feature));

        return Err(if requested_supported {
            ResolveError::Incompatible
        } else {
            ResolveError::FeatureFlagsNotSet
        });
    }

    if !validation.diagnostic.is_empty() {
        warn!(
            "Continuing with [{}] despite incomplete configuration: {}",
            features,
            validation.diagnostic.trim_end()
        );
    }
    debug!("Resolved monitoring features: [{}]", features);
    Ok(features)
}

/// Everything produced for one plugin in one pass
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPlugin {
    pub features: FeatureSet,
    pub manifest: PluginManifest,
    pub service: ServiceDescriptor,
}

/// Runs validation, resolution and building for UIPlugin resources.
///
/// Holds only immutable inputs, so one instance can serve concurrent passes.
#[derive(Debug, Clone, Default)]
pub struct MonitoringResolver {
    defaults: ResolverDefaults,
}

impl MonitoringResolver {
    pub fn new(defaults: ResolverDefaults) -> Self {
        Self { defaults }
    }

    pub fn resolve_plugin(
        &self,
        plugin: &UIPlugin,
        target: &PluginTarget,
        platform: &PlatformSupport,
    ) -> ResolveResult<ResolvedPlugin> {
        let Some(monitoring) = plugin.spec.monitoring.as_ref() else {
            return Err(ResolveError::missing_configuration(plugin.spec.plugin_type.as_str()));
        };

        let config = monitoring.normalize(&self.defaults);
        let validation = validator::validate(&config);
        debug!(
            "Validated monitoring configuration: alerting_valid={}, dashboard_valid={}",
            validation.alerting_valid, validation.dashboard_valid
        );

        let features = resolve(&config, &validation, platform)?;
        let (manifest, service) = manifest::build(&features, &config, target);

        info!(
            "Built {} manifest for {}/{} with features [{}]",
            manifest.console_name, target.namespace, target.name, features
        );
        Ok(ResolvedPlugin { features, manifest, service })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitoring::config::{AlertingConfig, DashboardConfig, IncidentsConfig, Intent};
    use crate::monitoring::validator::{
        ALERTING_CONTEXT, DASHBOARD_CONTEXT, PERSES_NAMESPACE_EMPTY, THANOS_QUERIER_EMPTY,
    };

    const ON: Intent = Intent::Explicit { enabled: true };
    const OFF: Intent = Intent::Explicit { enabled: false };

    fn config(
        alerting: (Intent, &str, &str),
        dashboard: (Intent, &str, &str),
        incidents: Intent,
    ) -> NormalizedMonitoring {
        NormalizedMonitoring {
            alerting: AlertingConfig {
                intent: alerting.0,
                alertmanager_url: alerting.1.to_string(),
                thanos_querier_url: alerting.2.to_string(),
            },
            dashboard: DashboardConfig {
                intent: dashboard.0,
                name: dashboard.1.to_string(),
                namespace: dashboard.2.to_string(),
            },
            incidents: IncidentsConfig { intent: incidents },
        }
    }

    fn platform(acm_version: Option<&str>) -> PlatformSupport {
        PlatformSupport::new(Feature::ALL.into_iter().collect(), acm_version.map(str::to_string))
    }

    fn run(config: &NormalizedMonitoring, platform: &PlatformSupport) -> ResolveResult<FeatureSet> {
        let validation = validator::validate(config);
        resolve(config, &validation, platform)
    }

    #[test]
    fn test_no_intent() {
        let cfg = config((OFF, "", ""), (OFF, "", ""), OFF);
        assert_eq!(run(&cfg, &platform(Some("2.11"))), Err(ResolveError::NoIntent));
    }

    #[test]
    fn test_all_features() {
        let cfg = config((ON, "https://am", "https://tq"), (ON, "perses", "ns"), ON);
        let features = run(&cfg, &platform(Some("2.12"))).unwrap();
        assert_eq!(features.joined(), "acm-alerting,perses-dashboards,incidents");
    }

    #[test]
    fn test_missing_thanos_querier_reports_diagnostic() {
        let cfg = config((ON, "https://am", ""), (OFF, "", ""), OFF);
        let error = run(&cfg, &platform(Some("2.12"))).unwrap_err();
        assert_eq!(error.to_string(), format!("{}{}", ALERTING_CONTEXT, THANOS_QUERIER_EMPTY));
        assert!(error.is_configuration_error());
    }

    #[test]
    fn test_incidents_only() {
        let cfg = config((OFF, "", ""), (OFF, "", ""), ON);
        let features = run(&cfg, &platform(None)).unwrap();
        assert_eq!(features.joined(), "incidents");
    }

    #[test]
    fn test_incomplete_alerting_dropped_when_dashboard_is_valid() {
        let cfg = config((ON, "https://am", ""), (ON, "perses", "ns"), OFF);
        let features = run(&cfg, &platform(Some("2.12"))).unwrap();
        assert_eq!(features.joined(), "perses-dashboards");
    }

    #[test]
    fn test_gate_drops_alerting_silently_when_dashboard_remains() {
        let cfg = config((ON, "https://am", "https://tq"), (ON, "perses", "ns"), OFF);
        let features = run(&cfg, &platform(Some("2.10"))).unwrap();
        assert_eq!(features.joined(), "perses-dashboards");
    }

    #[test]
    fn test_gate_only_failure_is_incompatible() {
        let cfg = config((ON, "https://am", "https://tq"), (OFF, "", ""), OFF);
        assert_eq!(run(&cfg, &platform(Some("2.10"))), Err(ResolveError::Incompatible));
        assert_eq!(run(&cfg, &platform(None)), Err(ResolveError::Incompatible));
        assert_eq!(run(&cfg, &platform(Some("garbage"))), Err(ResolveError::Incompatible));
    }

    #[test]
    fn test_unsupported_platform_reports_feature_flags() {
        let cfg = config((ON, "https://am", "https://tq"), (OFF, "", ""), OFF);
        let unsupported = PlatformSupport::new(
            [Feature::PersesDashboards].into_iter().collect(),
            Some("2.12".to_string()),
        );
        assert_eq!(run(&cfg, &unsupported), Err(ResolveError::FeatureFlagsNotSet));

        let nothing = PlatformSupport::new(FeatureSet::new(), Some("2.12".to_string()));
        assert_eq!(run(&cfg, &nothing), Err(ResolveError::FeatureFlagsNotSet));
    }

    #[test]
    fn test_supported_but_invalid_dashboard_with_gated_alerting() {
        let cfg = config((ON, "https://am", "https://tq"), (ON, "perses", ""), OFF);
        let error = run(&cfg, &platform(Some("2.0"))).unwrap_err();
        assert_eq!(error.to_string(), format!("{}{}", DASHBOARD_CONTEXT, PERSES_NAMESPACE_EMPTY));
    }

    #[test]
    fn test_disabled_complete_dashboard_does_not_mask_alerting_diagnostic() {
        let cfg = config((ON, "https://am", ""), (OFF, "perses", "ns"), OFF);
        let error = run(&cfg, &platform(Some("2.12"))).unwrap_err();
        assert_eq!(error.to_string(), format!("{}{}", ALERTING_CONTEXT, THANOS_QUERIER_EMPTY));
    }

    #[test]
    fn test_disabled_complete_alerting_does_not_mask_dashboard_diagnostic() {
        let cfg = config((OFF, "https://am", "https://tq"), (ON, "perses", ""), OFF);
        let error = run(&cfg, &platform(Some("2.12"))).unwrap_err();
        assert_eq!(error.to_string(), format!("{}{}", DASHBOARD_CONTEXT, PERSES_NAMESPACE_EMPTY));
    }

    #[test]
    fn test_unsupported_incidents_keeps_alerting_diagnostic() {
        let cfg = config((ON, "https://am", ""), (OFF, "", ""), ON);
        let alerting_only = PlatformSupport::new(
            [Feature::AcmAlerting].into_iter().collect(),
            Some("2.12".to_string()),
        );
        let error = run(&cfg, &alerting_only).unwrap_err();
        assert!(error.is_configuration_error());
        assert_eq!(error.to_string(), format!("{}{}", ALERTING_CONTEXT, THANOS_QUERIER_EMPTY));
    }

    #[test]
    fn test_supported_incidents_survives_incomplete_alerting() {
        let cfg = config((ON, "https://am", ""), (OFF, "perses", "ns"), ON);
        let features = run(&cfg, &platform(Some("2.12"))).unwrap();
        assert_eq!(features.joined(), "incidents");
    }

    #[test]
    fn test_custom_gate() {
        let cfg = config((ON, "https://am", "https://tq"), (OFF, "", ""), OFF);
        let relaxed = platform(Some("2.5")).with_gate(DependencyGate::new("acm", "2.0"));
        assert_eq!(run(&cfg, &relaxed).unwrap().joined(), "acm-alerting");
    }

    #[test]
    fn test_resolve_is_deterministic() {
        let cfg = config((ON, "https://am", ""), (ON, "", "ns"), OFF);
        let first = run(&cfg, &platform(Some("2.12")));
        let second = run(&cfg, &platform(Some("2.12")));
        assert_eq!(first, second);
    }

    #[test]
    fn test_missing_monitoring_block() {
        let plugin: UIPlugin = serde_yaml::from_str("spec:\n  type: Monitoring\n").unwrap();
        let resolver = MonitoringResolver::default();
        let error = resolver
            .resolve_plugin(&plugin, &PluginTarget::new("ns", "monitoring", "img"), &platform(None))
            .unwrap_err();
        assert_eq!(
            error.to_string(),
            "monitoring configuration can not be empty for plugin type Monitoring"
        );
    }
}

//! Console Plugin Manifest Builder
//!
//! Turns a resolved feature set into the plugin descriptor consumed by the
//! deployment generator. Proxies are emitted twice, once per consumer API
//! shape, from the same route table the service builder uses.

use serde::{Deserialize, Serialize};

use super::config::NormalizedMonitoring;
use super::features::{Feature, FeatureSet};
use super::service::{self, ServiceDescriptor};

pub const CONSOLE_NAME: &str = "monitoring-console-plugin";
pub const DISPLAY_NAME: &str = "Monitoring Console Plugin";
pub const CONFIG_PATH: &str = "/opt/app-root/config";
pub const STATIC_PATH: &str = "/opt/app-root/web/dist";

pub const BACKEND_PORT: i32 = 9443;
pub const ALERTMANAGER_PROXY_PORT: i32 = 9444;
pub const THANOS_PROXY_PORT: i32 = 9445;
pub const PERSES_PROXY_PORT: i32 = 8080;

const USER_TOKEN: &str = "UserToken";
const SERVICE_ENDPOINT: &str = "Service";

/// Where a proxy forwards to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upstream {
    /// The plugin's own service
    Plugin,
    /// The configured dashboard service
    Dashboard,
}

/// One proxy alias and the port it is served on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProxyRoute {
    pub alias: &'static str,
    pub port: i32,
    pub upstream: Upstream,
}

pub const BACKEND_ROUTE: ProxyRoute = ProxyRoute {
    alias: "backend",
    port: BACKEND_PORT,
    upstream: Upstream::Plugin,
};
pub const ALERTMANAGER_ROUTE: ProxyRoute = ProxyRoute {
    alias: "alertmanager-proxy",
    port: ALERTMANAGER_PROXY_PORT,
    upstream: Upstream::Plugin,
};
pub const THANOS_ROUTE: ProxyRoute = ProxyRoute {
    alias: "thanos-proxy",
    port: THANOS_PROXY_PORT,
    upstream: Upstream::Plugin,
};
pub const PERSES_ROUTE: ProxyRoute = ProxyRoute {
    alias: "perses",
    port: PERSES_PROXY_PORT,
    upstream: Upstream::Dashboard,
};

/// Routes exposed for a feature set, backend first
pub fn routes(features: &FeatureSet) -> Vec<ProxyRoute> {
    let mut routes = vec![BACKEND_ROUTE];
    if features.contains(Feature::AcmAlerting) {
        routes.push(ALERTMANAGER_ROUTE);
        routes.push(THANOS_ROUTE);
    }
    if features.contains(Feature::PersesDashboards) {
        routes.push(PERSES_ROUTE);
    }
    routes
}

/// Identity of the plugin being deployed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginTarget {
    pub namespace: String,
    pub name: String,
    pub image: String,
}

impl PluginTarget {
    pub fn new(
        namespace: impl Into<String>,
        name: impl Into<String>,
        image: impl Into<String>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            image: image.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsolePluginProxyServiceConfig {
    pub name: String,
    pub namespace: String,
    pub port: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsolePluginProxyEndpoint {
    #[serde(rename = "type")]
    pub endpoint_type: String,
    pub service: ConsolePluginProxyServiceConfig,
}

/// Proxy entry in the current console plugin API shape
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsolePluginProxy {
    pub alias: String,
    pub authorization: String,
    pub endpoint: ConsolePluginProxyEndpoint,
}

/// Proxy entry in the older console plugin API shape
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyConsolePluginProxy {
    #[serde(rename = "type")]
    pub proxy_type: String,
    pub alias: String,
    pub authorize: bool,
    pub service: ConsolePluginProxyServiceConfig,
}

impl ConsolePluginProxy {
    fn new(alias: &str, service: ConsolePluginProxyServiceConfig) -> Self {
        Self {
            alias: alias.to_string(),
            authorization: USER_TOKEN.to_string(),
            endpoint: ConsolePluginProxyEndpoint {
                endpoint_type: SERVICE_ENDPOINT.to_string(),
                service,
            },
        }
    }
}

impl LegacyConsolePluginProxy {
    fn new(alias: &str, service: ConsolePluginProxyServiceConfig) -> Self {
        Self {
            proxy_type: SERVICE_ENDPOINT.to_string(),
            alias: alias.to_string(),
            authorize: true,
            service,
        }
    }
}

/// Plugin descriptor handed to the deployment generator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginManifest {
    pub image: String,
    pub name: String,
    pub console_name: String,
    pub display_name: String,
    pub resource_namespace: String,
    pub features: FeatureSet,
    pub extra_args: Vec<String>,
    pub proxies: Vec<ConsolePluginProxy>,
    pub legacy_proxies: Vec<LegacyConsolePluginProxy>,
}

impl PluginManifest {
    pub fn proxy_aliases(&self) -> Vec<&str> {
        self.proxies.iter().map(|p| p.alias.as_str()).collect()
    }

    pub fn has_proxy(&self, alias: &str) -> bool {
        self.proxies.iter().any(|p| p.alias == alias)
    }
}

fn extra_args(features: &FeatureSet, config: &NormalizedMonitoring) -> Vec<String> {
    let mut args = vec![
        format!("-features={}", features.joined()),
        format!("-config-path={}", CONFIG_PATH),
        format!("-static-path={}", STATIC_PATH),
    ];
    if features.contains(Feature::AcmAlerting) {
        args.push(format!("-alertmanager={}", config.alerting.alertmanager_url));
        args.push(format!("-thanos-querier={}", config.alerting.thanos_querier_url));
    }
    args
}

/// Build the manifest and the service exposing its proxies.
///
/// `features` must come from a successful resolution of `config`.
pub fn build(
    features: &FeatureSet,
    config: &NormalizedMonitoring,
    target: &PluginTarget,
) -> (PluginManifest, ServiceDescriptor) {
    let mut proxies = Vec::new();
    let mut legacy_proxies = Vec::new();

    for route in routes(features) {
        let service = match route.upstream {
            Upstream::Plugin => ConsolePluginProxyServiceConfig {
                name: target.name.clone(),
                namespace: target.namespace.clone(),
                port: route.port,
            },
            Upstream::Dashboard => ConsolePluginProxyServiceConfig {
                name: config.dashboard.name.clone(),
                namespace: config.dashboard.namespace.clone(),
                port: route.port,
            },
        };
        legacy_proxies.push(LegacyConsolePluginProxy::new(route.alias, service.clone()));
        proxies.push(ConsolePluginProxy::new(route.alias, service));
    }

    let manifest = PluginManifest {
        image: target.image.clone(),
        name: target.name.clone(),
        console_name: CONSOLE_NAME.to_string(),
        display_name: DISPLAY_NAME.to_string(),
        resource_namespace: target.namespace.clone(),
        features: features.clone(),
        extra_args: extra_args(features, config),
        proxies,
        legacy_proxies,
    };
    let service = service::build_service(features, &target.name, &target.namespace);

    (manifest, service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitoring::config::{MonitoringConfiguration, ResolverDefaults};

    fn target() -> PluginTarget {
        PluginTarget::new("openshift-operators", "monitoring", "quay.io/monitoring-foo-test:123")
    }

    fn normalized(yaml: &str) -> NormalizedMonitoring {
        let config: MonitoringConfiguration = serde_yaml::from_str(yaml).unwrap();
        config.normalize(&ResolverDefaults::default())
    }

    const ALL_YAML: &str = r#"
acm:
  enabled: true
  alertmanager:
    url: https://alertmanager.open-cluster-management-observability.svc:9095
  thanosQuerier:
    url: https://rbac-query-proxy.open-cluster-management-observability.svc:8443
perses:
  enabled: true
  name: perses-api-http
  namespace: perses-operator
"#;

    #[test]
    fn test_routes_order() {
        let features: FeatureSet = Feature::ALL.into_iter().collect();
        let aliases: Vec<_> = routes(&features).iter().map(|r| r.alias).collect();
        assert_eq!(aliases, vec!["backend", "alertmanager-proxy", "thanos-proxy", "perses"]);

        let none = FeatureSet::new();
        assert_eq!(routes(&none), vec![BACKEND_ROUTE]);
    }

    #[test]
    fn test_full_manifest() {
        let features: FeatureSet = vec![Feature::AcmAlerting, Feature::PersesDashboards]
            .into_iter()
            .collect();
        let (manifest, _) = build(&features, &normalized(ALL_YAML), &target());

        assert_eq!(manifest.console_name, "monitoring-console-plugin");
        assert_eq!(manifest.display_name, "Monitoring Console Plugin");
        assert_eq!(manifest.image, "quay.io/monitoring-foo-test:123");
        assert_eq!(manifest.resource_namespace, "openshift-operators");
        assert_eq!(
            manifest.extra_args,
            vec![
                "-features=acm-alerting,perses-dashboards",
                "-config-path=/opt/app-root/config",
                "-static-path=/opt/app-root/web/dist",
                "-alertmanager=https://alertmanager.open-cluster-management-observability.svc:9095",
                "-thanos-querier=https://rbac-query-proxy.open-cluster-management-observability.svc:8443",
            ]
        );
        assert_eq!(
            manifest.proxy_aliases(),
            vec!["backend", "alertmanager-proxy", "thanos-proxy", "perses"]
        );
    }

    #[test]
    fn test_alerting_proxies_target_plugin_service() {
        let features: FeatureSet = [Feature::AcmAlerting].into_iter().collect();
        let (manifest, _) = build(&features, &normalized(ALL_YAML), &target());

        let thanos = &manifest.proxies[2];
        assert_eq!(thanos.alias, "thanos-proxy");
        assert_eq!(thanos.endpoint.service.name, "monitoring");
        assert_eq!(thanos.endpoint.service.namespace, "openshift-operators");
        assert_eq!(thanos.endpoint.service.port, 9445);
        assert!(!manifest.has_proxy("perses"));
    }

    #[test]
    fn test_dashboard_proxy_targets_perses() {
        let features: FeatureSet = [Feature::PersesDashboards].into_iter().collect();
        let (manifest, _) = build(&features, &normalized(ALL_YAML), &target());

        assert_eq!(manifest.proxies.len(), 2);
        let perses = &manifest.proxies[1];
        assert_eq!(perses.endpoint.service.name, "perses-api-http");
        assert_eq!(perses.endpoint.service.namespace, "perses-operator");
        assert_eq!(perses.endpoint.service.port, 8080);
        assert!(!manifest.extra_args.iter().any(|a| a.starts_with("-alertmanager")));
    }

    #[test]
    fn test_incidents_only_changes_feature_argument() {
        let features: FeatureSet = [Feature::Incidents].into_iter().collect();
        let (manifest, _) = build(&features, &normalized(ALL_YAML), &target());

        assert_eq!(manifest.extra_args[0], "-features=incidents");
        assert_eq!(manifest.proxy_aliases(), vec!["backend"]);
    }

    #[test]
    fn test_legacy_proxies_mirror_current_shape() {
        let features: FeatureSet = Feature::ALL.into_iter().collect();
        let (manifest, _) = build(&features, &normalized(ALL_YAML), &target());

        assert_eq!(manifest.proxies.len(), manifest.legacy_proxies.len());
        for (current, legacy) in manifest.proxies.iter().zip(&manifest.legacy_proxies) {
            assert_eq!(current.alias, legacy.alias);
            assert_eq!(current.endpoint.service, legacy.service);
            assert_eq!(current.authorization, "UserToken");
            assert!(legacy.authorize);
            assert_eq!(legacy.proxy_type, "Service");
        }
    }

    #[test]
    fn test_proxy_serialization_shapes() {
        let features = FeatureSet::new();
        let (manifest, _) = build(&features, &normalized(ALL_YAML), &target());

        let current = serde_json::to_string(&manifest.proxies[0]).unwrap();
        assert_eq!(
            current,
            r#"{"alias":"backend","authorization":"UserToken","endpoint":{"type":"Service","service":{"name":"monitoring","namespace":"openshift-operators","port":9443}}}"#
        );
        let legacy = serde_json::to_string(&manifest.legacy_proxies[0]).unwrap();
        assert_eq!(
            legacy,
            r#"{"type":"Service","alias":"backend","authorize":true,"service":{"name":"monitoring","namespace":"openshift-operators","port":9443}}"#
        );
    }
}

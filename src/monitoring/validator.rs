//! Monitoring Configuration Validator
//!
//! Decides whether each sub-configuration is complete enough to activate and
//! assembles the diagnostic shown to the user when it is not. The order in
//! which fragments are concatenated is part of the contract.

use super::config::NormalizedMonitoring;

pub const ALERTING_CONTEXT: &str =
    "acm-alerting requires alertmanager and thanosQuerier locations, set monitoring.acm.enabled with both urls to enable alerting\n";
pub const DASHBOARD_CONTEXT: &str =
    "perses-dashboards requires a perses service name and namespace, set monitoring.perses.enabled with both fields to enable dashboards\n";
pub const ALERTMANAGER_EMPTY: &str = "alertmanager location is empty for plugin type monitoring\n";
pub const THANOS_QUERIER_EMPTY: &str =
    "thanosQuerier location is empty for plugin type monitoring\n";
pub const PERSES_NAME_EMPTY: &str = "persesName location is empty for plugin type monitoring\n";
pub const PERSES_NAMESPACE_EMPTY: &str =
    "persesNamespace location is empty for plugin type monitoring\n";

/// Outcome of validating one monitoring configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validation {
    pub alerting_valid: bool,
    pub dashboard_valid: bool,
    /// Empty when nothing requested is incomplete
    pub diagnostic: String,
}

/// Validate a normalized monitoring configuration.
///
/// Validity only looks at the fields. Diagnostics are reported for
/// sub-configurations that were requested and are incomplete; an unrequested
/// empty section is not an error.
pub fn validate(config: &NormalizedMonitoring) -> Validation {
    let alerting = &config.alerting;
    let dashboard = &config.dashboard;

    let alerting_valid =
        !alerting.alertmanager_url.is_empty() && !alerting.thanos_querier_url.is_empty();
    let dashboard_valid = !dashboard.name.is_empty() && !dashboard.namespace.is_empty();

    let report_alerting = alerting.intent.requested() && !alerting_valid;
    let report_dashboard = dashboard.intent.requested() && !dashboard_valid;

    let mut diagnostic = String::new();
    if report_alerting {
        diagnostic.push_str(ALERTING_CONTEXT);
    }
    if report_dashboard {
        diagnostic.push_str(DASHBOARD_CONTEXT);
    }
    if report_alerting {
        if alerting.alertmanager_url.is_empty() {
            diagnostic.push_str(ALERTMANAGER_EMPTY);
        }
        if alerting.thanos_querier_url.is_empty() {
            diagnostic.push_str(THANOS_QUERIER_EMPTY);
        }
    }
    if report_dashboard {
        if dashboard.name.is_empty() {
            diagnostic.push_str(PERSES_NAME_EMPTY);
        }
        if dashboard.namespace.is_empty() {
            diagnostic.push_str(PERSES_NAMESPACE_EMPTY);
        }
    }

    Validation {
        alerting_valid,
        dashboard_valid,
        diagnostic,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitoring::config::{
        AlertingConfig, DashboardConfig, IncidentsConfig, Intent, NormalizedMonitoring,
    };

    fn config(
        alerting: (Intent, &str, &str),
        dashboard: (Intent, &str, &str),
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
            incidents: IncidentsConfig { intent: Intent::LegacyImplicit { populated: false } },
        }
    }

    const ON: Intent = Intent::Explicit { enabled: true };
    const OFF: Intent = Intent::Explicit { enabled: false };

    #[test]
    fn test_complete_configuration() {
        let result = validate(&config((ON, "https://am", "https://tq"), (ON, "perses", "ns")));
        assert!(result.alerting_valid);
        assert!(result.dashboard_valid);
        assert_eq!(result.diagnostic, "");
    }

    #[test]
    fn test_missing_thanos_querier() {
        let result = validate(&config((ON, "https://am", ""), (OFF, "", "")));
        assert!(!result.alerting_valid);
        assert!(!result.dashboard_valid);
        assert_eq!(
            result.diagnostic,
            "acm-alerting requires alertmanager and thanosQuerier locations, set monitoring.acm.enabled with both urls to enable alerting\n\
             thanosQuerier location is empty for plugin type monitoring\n"
        );
    }

    #[test]
    fn test_everything_missing_orders_context_before_fields() {
        let result = validate(&config((ON, "", ""), (ON, "", "")));
        assert_eq!(
            result.diagnostic,
            "acm-alerting requires alertmanager and thanosQuerier locations, set monitoring.acm.enabled with both urls to enable alerting\n\
             perses-dashboards requires a perses service name and namespace, set monitoring.perses.enabled with both fields to enable dashboards\n\
             alertmanager location is empty for plugin type monitoring\n\
             thanosQuerier location is empty for plugin type monitoring\n\
             persesName location is empty for plugin type monitoring\n\
             persesNamespace location is empty for plugin type monitoring\n"
        );
    }

    #[test]
    fn test_dashboard_namespace_missing() {
        let result = validate(&config((OFF, "", ""), (ON, "perses", "")));
        assert_eq!(
            result.diagnostic,
            format!("{}{}", DASHBOARD_CONTEXT, PERSES_NAMESPACE_EMPTY)
        );
    }

    #[test]
    fn test_unrequested_sections_are_silent() {
        let result = validate(&config((OFF, "", ""), (OFF, "", "")));
        assert!(!result.alerting_valid);
        assert!(!result.dashboard_valid);
        assert!(result.diagnostic.is_empty());
    }

    #[test]
    fn test_disabled_but_complete_is_still_valid() {
        let result = validate(&config((OFF, "https://am", "https://tq"), (OFF, "", "")));
        assert!(result.alerting_valid);
    }
}

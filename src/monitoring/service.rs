//! Plugin service object: one TCP port per proxy route.

use std::collections::BTreeMap;

use k8s_openapi::api::core::v1::{Service, ServicePort, ServiceSpec};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;

use super::features::FeatureSet;
use super::manifest::routes;

/// The service generator consumes a plain `v1/Service`
pub type ServiceDescriptor = Service;

pub const SERVING_CERT_ANNOTATION: &str = "service.beta.openshift.io/serving-cert-secret-name";
pub const MANAGED_BY: &str = "observability-operator";
pub const PART_OF: &str = "UIPlugin";

pub fn component_labels(name: &str) -> BTreeMap<String, String> {
    BTreeMap::from([
        ("app.kubernetes.io/instance".to_string(), name.to_string()),
        ("app.kubernetes.io/part-of".to_string(), PART_OF.to_string()),
        ("app.kubernetes.io/managed-by".to_string(), MANAGED_BY.to_string()),
    ])
}

pub fn build_service(features: &FeatureSet, name: &str, namespace: &str) -> ServiceDescriptor {
    let ports = routes(features)
        .into_iter()
        .map(|route| ServicePort {
            name: Some(route.alias.to_string()),
            port: route.port,
            protocol: Some("TCP".to_string()),
            target_port: Some(IntOrString::Int(route.port)),
            ..Default::default()
        })
        .collect();

    Service {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            labels: Some(component_labels(name)),
            annotations: Some(BTreeMap::from([(
                SERVING_CERT_ANNOTATION.to_string(),
                name.to_string(),
            )])),
            ..Default::default()
        },
        spec: Some(ServiceSpec {
            ports: Some(ports),
            selector: Some(component_labels(name)),
            type_: Some("ClusterIP".to_string()),
            ..Default::default()
        }),
        ..Default::default()
    }
}

/// `(name, port)` pairs of a service, in declaration order
pub fn port_entries(service: &ServiceDescriptor) -> Vec<(String, i32)> {
    service
        .spec
        .as_ref()
        .and_then(|spec| spec.ports.as_ref())
        .map(|ports| {
            ports
                .iter()
                .map(|p| (p.name.clone().unwrap_or_default(), p.port))
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitoring::features::Feature;

    #[test]
    fn test_backend_only() {
        let service = build_service(&FeatureSet::new(), "monitoring", "openshift-operators");
        assert_eq!(port_entries(&service), vec![("backend".to_string(), 9443)]);
    }

    #[test]
    fn test_ports_follow_features() {
        let features: FeatureSet = Feature::ALL.into_iter().collect();
        let service = build_service(&features, "monitoring", "openshift-operators");
        assert_eq!(
            port_entries(&service),
            vec![
                ("backend".to_string(), 9443),
                ("alertmanager-proxy".to_string(), 9444),
                ("thanos-proxy".to_string(), 9445),
                ("perses".to_string(), 8080),
            ]
        );

        let spec = service.spec.unwrap();
        assert_eq!(spec.type_.as_deref(), Some("ClusterIP"));
        for port in spec.ports.unwrap() {
            assert_eq!(port.protocol.as_deref(), Some("TCP"));
            assert_eq!(port.target_port, Some(IntOrString::Int(port.port)));
        }
    }

    #[test]
    fn test_metadata() {
        let service = build_service(&FeatureSet::new(), "monitoring", "openshift-operators");
        let metadata = service.metadata;
        assert_eq!(metadata.name.as_deref(), Some("monitoring"));
        assert_eq!(metadata.namespace.as_deref(), Some("openshift-operators"));
        assert_eq!(
            metadata.annotations.unwrap().get(SERVING_CERT_ANNOTATION).map(String::as_str),
            Some("monitoring")
        );
        let labels = metadata.labels.unwrap();
        assert_eq!(
            labels.get("app.kubernetes.io/instance").map(String::as_str),
            Some("monitoring")
        );
        assert_eq!(labels, component_labels("monitoring"));
    }

    #[test]
    fn test_serializes_type_meta() {
        let service = build_service(&FeatureSet::new(), "monitoring", "openshift-operators");
        let json = serde_json::to_value(&service).unwrap();
        assert_eq!(json["apiVersion"], "v1");
        assert_eq!(json["kind"], "Service");
        assert_eq!(json["spec"]["ports"][0]["targetPort"], 9443);
    }
}

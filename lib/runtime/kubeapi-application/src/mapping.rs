//! Conversion from raw cluster objects to inventory records.

use k8s_openapi::api::core::v1::{Namespace, Service, ServicePort};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{ObjectMeta, Time};
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;

use kubeapi_domain::{
    ClusterIdentity, NamespaceRecord, PortSpec, ServiceRecord, format_timestamp, namespace_id,
    service_id,
};

pub fn object_name(meta: &ObjectMeta) -> &str {
    meta.name.as_deref().unwrap_or_default()
}

fn created_at(meta: &ObjectMeta) -> String {
    meta.creation_timestamp
        .as_ref()
        .map(|Time(ts)| format_timestamp(*ts))
        .unwrap_or_default()
}

pub fn namespace_phase(namespace: &Namespace) -> &str {
    namespace
        .status
        .as_ref()
        .and_then(|status| status.phase.as_deref())
        .unwrap_or_default()
}

pub fn namespace_record(identity: &ClusterIdentity, namespace: &Namespace) -> NamespaceRecord {
    let name = object_name(&namespace.metadata);
    NamespaceRecord {
        namespace_id: namespace_id(&identity.cluster_id, name),
        name: name.to_string(),
        status: namespace_phase(namespace).to_string(),
        cluster_id: identity.cluster_id.clone(),
        cluster_name: identity.cluster_name.clone(),
        created_at: created_at(&namespace.metadata),
    }
}

/// `namespace` is the namespace the service was listed from; it keys the
/// record even if the object's own metadata omits it.
pub fn service_record(
    identity: &ClusterIdentity,
    namespace: &str,
    service: &Service,
) -> ServiceRecord {
    let name = object_name(&service.metadata);
    let spec = service.spec.as_ref();
    ServiceRecord {
        service_id: service_id(&identity.cluster_id, namespace, name),
        name: name.to_string(),
        namespace: namespace.to_string(),
        namespace_id: namespace_id(&identity.cluster_id, namespace),
        cluster_id: identity.cluster_id.clone(),
        cluster_name: identity.cluster_name.clone(),
        service_type: spec
            .and_then(|spec| spec.type_.clone())
            .unwrap_or_default(),
        cluster_ip: spec
            .and_then(|spec| spec.cluster_ip.clone())
            .unwrap_or_default(),
        ports: spec
            .and_then(|spec| spec.ports.as_ref())
            .map(|ports| ports.iter().map(port_spec).collect())
            .unwrap_or_default(),
        selector: spec
            .and_then(|spec| spec.selector.clone())
            .unwrap_or_default(),
        created_at: created_at(&service.metadata),
    }
}

pub fn port_spec(port: &ServicePort) -> PortSpec {
    PortSpec {
        name: port.name.clone(),
        protocol: port.protocol.clone().unwrap_or_else(|| "TCP".to_string()),
        port: port.port,
        target_port: port.target_port.as_ref().map(|target| match target {
            IntOrString::Int(value) => value.to_string(),
            IntOrString::String(value) => value.clone(),
        }),
        node_port: port.node_port,
        app_protocol: port.app_protocol.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kubeapi_ports::fake;

    fn identity() -> ClusterIdentity {
        ClusterIdentity::new("c1", "prod", "eu-west-1").unwrap()
    }

    #[test]
    fn maps_namespace() {
        let record = namespace_record(&identity(), &fake::namespace("team-a", "Terminating"));
        assert_eq!(record.namespace_id, "c1/team-a");
        assert_eq!(record.name, "team-a");
        assert_eq!(record.status, "Terminating");
        assert_eq!(record.cluster_name, "prod");
        assert_eq!(record.created_at, "2024-03-05 07:08:09");
    }

    #[test]
    fn creation_time_drops_milliseconds() {
        let mut namespace = fake::namespace("team-a", "Active");
        // 2024-03-05T07:08:09.123Z
        let ts = k8s_openapi::chrono::DateTime::from_timestamp_millis(1_709_622_489_123).unwrap();
        namespace.metadata.creation_timestamp = Some(Time(ts));

        let record = namespace_record(&identity(), &namespace);
        assert_eq!(record.created_at, "2024-03-05 07:08:09");
    }

    #[test]
    fn maps_service() {
        let record = service_record(&identity(), "team-a", &fake::service("team-a", "web"));
        assert_eq!(record.service_id, "c1/team-a/web");
        assert_eq!(record.namespace_id, "c1/team-a");
        assert_eq!(record.service_type, "ClusterIP");
        assert_eq!(record.cluster_ip, "10.96.0.10");
        assert_eq!(record.ports.len(), 1);
        assert_eq!(record.ports[0].target_port.as_deref(), Some("8080"));
        assert_eq!(record.ports[0].protocol, "TCP");
        assert_eq!(record.selector.get("app").map(String::as_str), Some("web"));
        assert_eq!(record.created_at, "2024-03-05 07:08:09");
    }

    #[test]
    fn bare_objects_map_to_empty_fields() {
        let service = Service::default();
        let record = service_record(&identity(), "ns", &service);
        assert_eq!(record.name, "");
        assert_eq!(record.service_id, "c1/ns/");
        assert!(record.ports.is_empty());
        assert!(record.selector.is_empty());
        assert_eq!(record.created_at, "");

        let namespace = namespace_record(&identity(), &Namespace::default());
        assert_eq!(namespace.status, "");
    }

    #[test]
    fn named_target_port_is_kept() {
        let port = ServicePort {
            port: 443,
            target_port: Some(IntOrString::String("https".into())),
            ..Default::default()
        };
        let spec = port_spec(&port);
        assert_eq!(spec.target_port.as_deref(), Some("https"));
        assert_eq!(spec.protocol, "TCP");
    }
}

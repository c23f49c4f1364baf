use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{debug, warn};

use kubeapi_domain::{ApiResponse, ClusterIdentity, NamespaceRecord, ServiceRecord};
use kubeapi_ports::{ClusterReaderPort, IdentitySource};

use crate::mapping::{namespace_record, object_name, service_record};

/// Live listings for interactive requests; never touches the cache.
#[derive(Clone)]
pub struct QueryService {
    reader: Arc<dyn ClusterReaderPort>,
    identity: Arc<dyn IdentitySource>,
}

impl QueryService {
    pub fn new(reader: Arc<dyn ClusterReaderPort>, identity: Arc<dyn IdentitySource>) -> Self {
        Self { reader, identity }
    }

    /// `GET /api/v1/k8s/namespaces`
    pub async fn get_namespaces(&self) -> ApiResponse<Vec<NamespaceRecord>> {
        let response = ApiResponse::from(self.list_namespaces().await);
        if !response.is_ok() {
            warn!(error = %response.message, "Namespace listing failed");
        }
        response
    }

    /// `GET /api/v1/k8s/services`
    pub async fn get_services(&self) -> ApiResponse<Vec<ServiceRecord>> {
        let response = ApiResponse::from(self.list_services().await);
        if !response.is_ok() {
            warn!(error = %response.message, "Service listing failed");
        }
        response
    }

    /// Namespaces whose phase is `Active`.
    pub async fn list_namespaces(&self) -> Result<Vec<NamespaceRecord>> {
        let identity = self.identity();
        let namespaces = self
            .reader
            .list_namespaces()
            .await
            .context("failed to list namespaces")?;
        Ok(namespaces
            .iter()
            .map(|namespace| namespace_record(&identity, namespace))
            .filter(NamespaceRecord::is_active)
            .collect())
    }

    /// Every service in every namespace. The first failing namespace aborts
    /// the whole listing.
    pub async fn list_services(&self) -> Result<Vec<ServiceRecord>> {
        let identity = self.identity();
        let namespaces = self
            .reader
            .list_namespaces()
            .await
            .context("failed to list namespaces")?;

        let mut records = Vec::new();
        for namespace in &namespaces {
            let name = object_name(&namespace.metadata);
            let services = self
                .reader
                .list_services(name)
                .await
                .with_context(|| format!("failed to list services in namespace {name}"))?;
            records.extend(
                services
                    .iter()
                    .map(|service| service_record(&identity, name, service)),
            );
        }
        Ok(records)
    }

    // Identity only decorates records here, so a missing one is not an error.
    fn identity(&self) -> ClusterIdentity {
        self.identity.resolve().unwrap_or_else(|err| {
            debug!(error = %err, "Cluster identity unavailable for live query");
            ClusterIdentity::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kubeapi_domain::{CODE_ERROR, CODE_OK};
    use kubeapi_ports::StaticIdentity;
    use kubeapi_ports::fake::FakeClusterReader;

    fn service(reader: FakeClusterReader) -> QueryService {
        QueryService::new(
            Arc::new(reader),
            Arc::new(StaticIdentity(
                ClusterIdentity::new("c1", "prod", "eu-west-1").unwrap(),
            )),
        )
    }

    #[tokio::test]
    async fn only_active_namespaces_are_listed() {
        let reader = FakeClusterReader::new()
            .with_namespace("default", "Active", &[])
            .with_namespace("kube-system", "Terminating", &[]);
        let response = service(reader).get_namespaces().await;

        assert_eq!(response.code, CODE_OK);
        let names: Vec<_> = response
            .data
            .unwrap()
            .into_iter()
            .map(|ns| ns.name)
            .collect();
        assert_eq!(names, ["default"]);
    }

    #[tokio::test]
    async fn namespace_failure_becomes_error_envelope() {
        let reader = FakeClusterReader::new().failing_namespace_list();
        let response = service(reader).get_namespaces().await;

        assert_eq!(response.code, CODE_ERROR);
        assert!(response.data.is_none());
        assert!(response.message.contains("namespaces is forbidden"));
    }

    #[tokio::test]
    async fn lists_services_across_namespaces() {
        let reader = FakeClusterReader::with_layout(&[("ns1", &["a", "b"]), ("ns2", &["c"])]);
        let records = service(reader).list_services().await.unwrap();

        let ids: Vec<_> = records.iter().map(|svc| svc.service_id.as_str()).collect();
        assert_eq!(ids, ["c1/ns1/a", "c1/ns1/b", "c1/ns2/c"]);
    }

    #[tokio::test]
    async fn first_service_failure_aborts_listing() {
        let reader =
            FakeClusterReader::with_layout(&[("ns1", &["a"]), ("broken", &["x"]), ("ns3", &["c"])])
                .failing_services_in("broken");
        let response = service(reader.clone()).get_services().await;

        assert_eq!(response.code, CODE_ERROR);
        assert!(response.data.is_none());
        assert!(response.message.contains("namespace broken"));
        assert_eq!(reader.service_calls(), 2);
    }

    #[tokio::test]
    async fn missing_identity_still_lists() {
        struct NoIdentity;
        impl IdentitySource for NoIdentity {
            fn resolve(&self) -> Result<ClusterIdentity> {
                anyhow::bail!("kubernetes cluster ID is empty")
            }
        }

        let query = QueryService::new(
            Arc::new(FakeClusterReader::with_layout(&[("ns1", &["a"])])),
            Arc::new(NoIdentity),
        );
        let records = query.list_services().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].cluster_id, "");
    }
}

use anyhow::Result;
use async_trait::async_trait;
use k8s_openapi::api::core::v1::{Namespace, Service};

/// Read-only view of a cluster API.
///
/// Implementations do not retry; callers own the retry policy.
#[async_trait]
pub trait ClusterReaderPort: Send + Sync {
    /// Git version of the API server, e.g. `v1.30.2`.
    async fn server_version(&self) -> Result<String>;

    async fn list_namespaces(&self) -> Result<Vec<Namespace>>;

    async fn list_services(&self, namespace: &str) -> Result<Vec<Service>>;
}

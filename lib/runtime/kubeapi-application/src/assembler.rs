use anyhow::{Result, anyhow};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use kubeapi_domain::{ClusterIdentity, ClusterSnapshot, now_formatted};
use kubeapi_ports::ClusterReaderPort;

use crate::error::SyncError;
use crate::mapping::{namespace_record, object_name, service_record};
use crate::shutdown::Shutdown;

/// Upper bound for any single cluster API call made during assembly.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(10);

/// Builds a [`ClusterSnapshot`] from a series of cluster reads.
#[derive(Clone)]
pub struct SnapshotAssembler {
    reader: Arc<dyn ClusterReaderPort>,
    call_timeout: Duration,
}

impl SnapshotAssembler {
    pub fn new(reader: Arc<dyn ClusterReaderPort>) -> Self {
        Self {
            reader,
            call_timeout: DEFAULT_CALL_TIMEOUT,
        }
    }

    pub fn with_call_timeout(mut self, call_timeout: Duration) -> Self {
        self.call_timeout = call_timeout;
        self
    }

    /// Reads the whole inventory and returns it as one snapshot.
    ///
    /// Only the namespace listing is fatal. The version lookup and the
    /// per-namespace service listings degrade to empty values. Shutdown is
    /// checked before each namespace's services are requested; once seen,
    /// nothing is returned but [`SyncError::Cancelled`].
    pub async fn assemble(
        &self,
        identity: &ClusterIdentity,
        shutdown: &Shutdown,
    ) -> Result<ClusterSnapshot, SyncError> {
        let k8s_version = match self
            .bounded("server version", self.reader.server_version())
            .await
        {
            Ok(version) => version,
            Err(err) => {
                warn!(error = %format!("{err:#}"), "Failed to get Kubernetes server version");
                String::new()
            }
        };

        let namespaces = self
            .bounded("list namespaces", self.reader.list_namespaces())
            .await
            .map_err(SyncError::Cluster)?;

        let mut services = Vec::new();
        let mut skipped = 0usize;
        for namespace in &namespaces {
            if shutdown.is_triggered() {
                info!(cluster = %identity.cluster_id, "Shutdown observed, abandoning assembly");
                return Err(SyncError::Cancelled);
            }

            let name = object_name(&namespace.metadata);
            match self
                .bounded("list services", self.reader.list_services(name))
                .await
            {
                Ok(items) => {
                    debug!(namespace = %name, count = items.len(), "Listed services");
                    services.extend(
                        items
                            .iter()
                            .map(|service| service_record(identity, name, service)),
                    );
                }
                Err(err) => {
                    skipped += 1;
                    warn!(
                        namespace = %name,
                        error = %format!("{err:#}"),
                        "Failed to list services in namespace, skipping"
                    );
                }
            }
        }

        let namespaces = namespaces
            .iter()
            .map(|namespace| namespace_record(identity, namespace))
            .collect::<Vec<_>>();

        debug!(
            cluster = %identity.cluster_id,
            namespaces = namespaces.len(),
            services = services.len(),
            skipped_namespaces = skipped,
            "Snapshot assembled"
        );

        Ok(ClusterSnapshot::new(
            identity,
            k8s_version,
            namespaces,
            services,
            now_formatted(),
        ))
    }

    async fn bounded<T>(&self, what: &str, call: impl Future<Output = Result<T>>) -> Result<T> {
        match tokio::time::timeout(self.call_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(anyhow!("{what} timed out after {:?}", self.call_timeout)),
        }
    }
}

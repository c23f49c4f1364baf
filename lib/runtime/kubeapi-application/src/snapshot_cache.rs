use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use kubeapi_domain::{ClusterSnapshot, snapshot_key};
use kubeapi_ports::SnapshotCachePort;

use crate::error::SyncError;

/// Lifetime of a published snapshot (1 hour).
pub const DEFAULT_SNAPSHOT_TTL: Duration = Duration::from_secs(60 * 60);

/// Publishes snapshots into, and reads them back from, the volatile store.
#[derive(Clone)]
pub struct SnapshotCache {
    store: Arc<dyn SnapshotCachePort>,
    key_prefix: String,
    ttl: Duration,
}

impl SnapshotCache {
    pub fn new(store: Arc<dyn SnapshotCachePort>, key_prefix: impl Into<String>) -> Self {
        Self {
            store,
            key_prefix: key_prefix.into(),
            ttl: DEFAULT_SNAPSHOT_TTL,
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn key_for(&self, cluster_id: &str) -> String {
        snapshot_key(&self.key_prefix, cluster_id)
    }

    /// Overwrites the cluster's entry with `snapshot` in a single write and
    /// returns the key it was stored under.
    pub async fn publish(&self, snapshot: &ClusterSnapshot) -> Result<String, SyncError> {
        let key = self.key_for(&snapshot.cluster_id);
        let payload = serde_json::to_vec(snapshot)?;
        self.store
            .set_with_ttl(&key, payload, self.ttl)
            .await
            .with_context(|| format!("failed to store snapshot under {key}"))
            .map_err(SyncError::Cache)?;
        debug!(key = %key, ttl_secs = self.ttl.as_secs(), "Snapshot published");
        Ok(key)
    }

    /// Latest published snapshot for `cluster_id`, if it has not expired.
    pub async fn fetch(&self, cluster_id: &str) -> Result<Option<ClusterSnapshot>> {
        let key = self.key_for(cluster_id);
        let Some(raw) = self
            .store
            .get(&key)
            .await
            .with_context(|| format!("failed to read snapshot under {key}"))?
        else {
            return Ok(None);
        };
        let snapshot = serde_json::from_slice(&raw)
            .with_context(|| format!("malformed snapshot under {key}"))?;
        Ok(Some(snapshot))
    }
}

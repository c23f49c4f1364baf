use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;

use kubeapi_adapter_kube::KubeClusterReader;
use kubeapi_adapter_redis::RedisSnapshotCache;
use kubeapi_application::{QueryService, SnapshotAssembler, SnapshotCache, SyncScheduler};
use kubeapi_domain::{KubeapiConfig, RedisConfig};
use kubeapi_ports::{ClusterReaderPort, ConfigIdentitySource, IdentitySource, SnapshotCachePort};

/// Collaborators built once at startup and handed to each component.
#[derive(Clone)]
pub struct Services {
    pub config: KubeapiConfig,
    pub reader: Arc<dyn ClusterReaderPort>,
    pub identity: Arc<dyn IdentitySource>,
}

impl Services {
    pub fn new(
        config: KubeapiConfig,
        reader: Arc<dyn ClusterReaderPort>,
        identity: Arc<dyn IdentitySource>,
    ) -> Self {
        Self {
            config,
            reader,
            identity,
        }
    }

    /// Connects to the cluster named by the config (or the inferred one).
    pub async fn connect(config: KubeapiConfig) -> Result<Self> {
        let reader = KubeClusterReader::connect(config.kubernetes.kubeconfig.as_deref()).await?;
        let identity = ConfigIdentitySource::new(config.kubernetes.clone());
        Ok(Self::new(config, Arc::new(reader), Arc::new(identity)))
    }

    pub fn query(&self) -> QueryService {
        QueryService::new(self.reader.clone(), self.identity.clone())
    }

    pub fn snapshot_cache(&self, store: Arc<dyn SnapshotCachePort>) -> SnapshotCache {
        SnapshotCache::new(store, self.config.redis.key_prefix.clone())
            .with_ttl(Duration::from_secs(self.config.sync.ttl_secs))
    }

    pub fn assembler(&self) -> SnapshotAssembler {
        SnapshotAssembler::new(self.reader.clone())
            .with_call_timeout(Duration::from_secs(self.config.sync.call_timeout_secs))
    }

    pub fn scheduler(&self, store: Arc<dyn SnapshotCachePort>) -> SyncScheduler {
        SyncScheduler::new(
            self.identity.clone(),
            self.assembler(),
            self.snapshot_cache(store),
            Duration::from_secs(self.config.sync.interval_secs.max(1)),
        )
    }
}

pub async fn redis_store(config: &RedisConfig) -> Result<Arc<dyn SnapshotCachePort>> {
    let cache = RedisSnapshotCache::connect(config).await?;
    Ok(Arc::new(cache))
}

use anyhow::Result;

use kubeapi_domain::{ClusterIdentity, KubernetesConfig};

/// Supplies the cluster identity for each sync attempt.
pub trait IdentitySource: Send + Sync {
    fn resolve(&self) -> Result<ClusterIdentity>;
}

#[derive(Debug, Clone)]
pub struct StaticIdentity(pub ClusterIdentity);

impl IdentitySource for StaticIdentity {
    fn resolve(&self) -> Result<ClusterIdentity> {
        self.0.validate()?;
        Ok(self.0.clone())
    }
}

/// Reads the environment on every call, falling back to the config file.
#[derive(Debug, Clone, Default)]
pub struct ConfigIdentitySource {
    file: KubernetesConfig,
}

impl ConfigIdentitySource {
    pub fn new(file: KubernetesConfig) -> Self {
        Self { file }
    }
}

impl IdentitySource for ConfigIdentitySource {
    fn resolve(&self) -> Result<ClusterIdentity> {
        ClusterIdentity::resolve(&self.file)
    }
}

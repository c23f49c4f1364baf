//! kube-rs implementation of the cluster reader port.

use anyhow::{Context, Result};
use async_trait::async_trait;
use k8s_openapi::api::core::v1::{Namespace, Service};
use kube::api::ListParams;
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Api, Client, Config};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

use kubeapi_ports::ClusterReaderPort;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const READ_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone)]
pub struct KubeClusterReader {
    client: Client,
}

impl KubeClusterReader {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Connects with an explicit kubeconfig when given, otherwise infers the
    /// config (in-cluster service account first, then `~/.kube/config`).
    pub async fn connect(kubeconfig: Option<&Path>) -> Result<Self> {
        let config = client_config(kubeconfig).await?;
        info!(cluster_url = %config.cluster_url, "Connecting to Kubernetes API");
        let client = Client::try_from(config).context("failed to create Kubernetes client")?;
        Ok(Self::new(client))
    }
}

async fn client_config(kubeconfig: Option<&Path>) -> Result<Config> {
    let mut config = match kubeconfig {
        Some(path) => {
            let kubeconfig = Kubeconfig::read_from(path)
                .with_context(|| format!("failed to read kubeconfig {}", path.display()))?;
            Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
                .await
                .with_context(|| format!("failed to load kubeconfig {}", path.display()))?
        }
        None => Config::infer()
            .await
            .context("failed to infer Kubernetes config")?,
    };
    config.connect_timeout = Some(CONNECT_TIMEOUT);
    config.read_timeout = Some(READ_TIMEOUT);
    Ok(config)
}

#[async_trait]
impl ClusterReaderPort for KubeClusterReader {
    async fn server_version(&self) -> Result<String> {
        let info = self
            .client
            .apiserver_version()
            .await
            .context("failed to get server version")?;
        Ok(info.git_version)
    }

    async fn list_namespaces(&self) -> Result<Vec<Namespace>> {
        let api: Api<Namespace> = Api::all(self.client.clone());
        let list = api
            .list(&ListParams::default())
            .await
            .context("failed to list namespaces")?;
        debug!(count = list.items.len(), "Listed namespaces");
        Ok(list.items)
    }

    async fn list_services(&self, namespace: &str) -> Result<Vec<Service>> {
        let api: Api<Service> = Api::namespaced(self.client.clone(), namespace);
        let list = api
            .list(&ListParams::default())
            .await
            .with_context(|| format!("failed to list services in namespace {namespace}"))?;
        Ok(list.items)
    }
}

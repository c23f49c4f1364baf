use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};

use crate::config::KubernetesConfig;

/// Identity of the cluster being inventoried.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterIdentity {
    #[serde(rename = "clusterID")]
    pub cluster_id: String,
    pub cluster_name: String,
    #[serde(rename = "clusterRegionID")]
    pub cluster_region_id: String,
}

impl ClusterIdentity {
    pub fn new(
        cluster_id: impl Into<String>,
        cluster_name: impl Into<String>,
        cluster_region_id: impl Into<String>,
    ) -> Result<Self> {
        let identity = Self {
            cluster_id: cluster_id.into(),
            cluster_name: cluster_name.into(),
            cluster_region_id: cluster_region_id.into(),
        };
        identity.validate()?;
        Ok(identity)
    }

    pub fn validate(&self) -> Result<()> {
        if self.cluster_id.trim().is_empty() {
            bail!("kubernetes cluster ID is empty");
        }
        if self.cluster_name.trim().is_empty() {
            bail!("kubernetes clusterName is empty");
        }
        if self.cluster_region_id.trim().is_empty() {
            bail!("kubernetes clusterRegionID is empty");
        }
        Ok(())
    }

    /// Resolves the identity from the process environment, falling back to
    /// the `kubernetes` config section field by field.
    pub fn resolve(file: &KubernetesConfig) -> Result<Self> {
        Self::resolve_with(|key| std::env::var(key).ok(), file)
    }

    /// Same as [`ClusterIdentity::resolve`] with an injectable variable lookup.
    ///
    /// For each field the dotted name (`kubernetes.clusterID`) wins over the
    /// `KUBEAPI_*` name, which wins over the file.
    pub fn resolve_with<F>(lookup: F, file: &KubernetesConfig) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let pick = |dotted: &str, upper: &str, fallback: &Option<String>| -> String {
            [lookup(dotted), lookup(upper), fallback.clone()]
                .into_iter()
                .flatten()
                .find(|value| !value.trim().is_empty())
                .unwrap_or_default()
        };

        let identity = Self {
            cluster_id: pick("kubernetes.clusterID", "KUBEAPI_CLUSTER_ID", &file.cluster_id),
            cluster_name: pick(
                "kubernetes.clusterName",
                "KUBEAPI_CLUSTER_NAME",
                &file.cluster_name,
            ),
            cluster_region_id: pick(
                "kubernetes.clusterRegionID",
                "KUBEAPI_CLUSTER_REGION_ID",
                &file.cluster_region_id,
            ),
        };
        identity.validate()?;
        Ok(identity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn file(id: Option<&str>, name: Option<&str>, region: Option<&str>) -> KubernetesConfig {
        KubernetesConfig {
            kubeconfig: None,
            cluster_id: id.map(str::to_string),
            cluster_name: name.map(str::to_string),
            cluster_region_id: region.map(str::to_string),
        }
    }

    #[test]
    fn env_overrides_file() {
        let env = HashMap::from([
            ("kubernetes.clusterID", "env-id"),
            ("KUBEAPI_CLUSTER_NAME", "env-name"),
        ]);
        let identity = ClusterIdentity::resolve_with(
            |key| env.get(key).map(|v| v.to_string()),
            &file(Some("file-id"), Some("file-name"), Some("file-region")),
        )
        .unwrap();

        assert_eq!(identity.cluster_id, "env-id");
        assert_eq!(identity.cluster_name, "env-name");
        assert_eq!(identity.cluster_region_id, "file-region");
    }

    #[test]
    fn empty_env_value_falls_through() {
        let env = HashMap::from([("kubernetes.clusterID", "")]);
        let identity = ClusterIdentity::resolve_with(
            |key| env.get(key).map(|v| v.to_string()),
            &file(Some("file-id"), Some("n"), Some("r")),
        )
        .unwrap();
        assert_eq!(identity.cluster_id, "file-id");
    }

    #[test]
    fn missing_field_is_an_error() {
        let err = ClusterIdentity::resolve_with(|_| None, &file(Some("id"), None, Some("r")))
            .unwrap_err();
        assert_eq!(err.to_string(), "kubernetes clusterName is empty");
    }

    #[test]
    fn new_rejects_blank_id() {
        assert!(ClusterIdentity::new(" ", "n", "r").is_err());
        assert!(ClusterIdentity::new("id", "n", "r").is_ok());
    }
}

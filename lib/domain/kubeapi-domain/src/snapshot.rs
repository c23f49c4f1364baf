use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::identity::ClusterIdentity;
use crate::records::{NamespaceRecord, ServiceRecord};

/// Cache key for a cluster's snapshot: `<prefix><clusterID>`.
pub fn snapshot_key(prefix: &str, cluster_id: &str) -> String {
    format!("{prefix}{cluster_id}")
}

/// Point-in-time inventory of one cluster.
///
/// Namespaces keep the order the cluster reported them in; services follow
/// their namespace's order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterSnapshot {
    #[serde(rename = "clusterID")]
    pub cluster_id: String,
    pub cluster_name: String,
    #[serde(rename = "clusterRegionID")]
    pub cluster_region_id: String,
    pub k8s_version: String,
    pub namespaces: Vec<NamespaceRecord>,
    pub services: Vec<ServiceRecord>,
    pub assembled_at: String,
}

impl ClusterSnapshot {
    pub fn new(
        identity: &ClusterIdentity,
        k8s_version: impl Into<String>,
        namespaces: Vec<NamespaceRecord>,
        services: Vec<ServiceRecord>,
        assembled_at: impl Into<String>,
    ) -> Self {
        Self {
            cluster_id: identity.cluster_id.clone(),
            cluster_name: identity.cluster_name.clone(),
            cluster_region_id: identity.cluster_region_id.clone(),
            k8s_version: k8s_version.into(),
            namespaces,
            services,
            assembled_at: assembled_at.into(),
        }
    }

    pub fn namespace(&self, name: &str) -> Option<&NamespaceRecord> {
        self.namespaces.iter().find(|ns| ns.name == name)
    }

    pub fn services_in<'a>(
        &'a self,
        namespace: &'a str,
    ) -> impl Iterator<Item = &'a ServiceRecord> {
        self.services.iter().filter(move |svc| svc.namespace == namespace)
    }

    /// Services whose `namespace_id` has no matching namespace record.
    ///
    /// Empty for every snapshot the assembler produces.
    pub fn dangling_services(&self) -> Vec<&ServiceRecord> {
        let known: HashSet<&str> = self
            .namespaces
            .iter()
            .map(|ns| ns.namespace_id.as_str())
            .collect();
        self.services
            .iter()
            .filter(|svc| !known.contains(svc.namespace_id.as_str()))
            .collect()
    }
}

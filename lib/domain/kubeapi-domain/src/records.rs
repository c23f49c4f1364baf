use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub fn namespace_id(cluster_id: &str, namespace: &str) -> String {
    format!("{cluster_id}/{namespace}")
}

pub fn service_id(cluster_id: &str, namespace: &str, name: &str) -> String {
    format!("{cluster_id}/{namespace}/{name}")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamespaceRecord {
    #[serde(rename = "namespaceID")]
    pub namespace_id: String,
    pub name: String,
    pub status: String,
    #[serde(rename = "clusterID")]
    pub cluster_id: String,
    pub cluster_name: String,
    pub created_at: String,
}

impl NamespaceRecord {
    pub fn is_active(&self) -> bool {
        self.status == "Active"
    }
}

/// One port of a service, in the shape the cluster API reports it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub protocol: String,
    pub port: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_port: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_port: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_protocol: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceRecord {
    #[serde(rename = "serviceID")]
    pub service_id: String,
    pub name: String,
    pub namespace: String,
    #[serde(rename = "namespaceID")]
    pub namespace_id: String,
    #[serde(rename = "clusterID")]
    pub cluster_id: String,
    pub cluster_name: String,
    #[serde(rename = "type")]
    pub service_type: String,
    #[serde(rename = "clusterIP")]
    pub cluster_ip: String,
    #[serde(default)]
    pub ports: Vec<PortSpec>,
    #[serde(default)]
    pub selector: BTreeMap<String, String>,
    pub created_at: String,
}

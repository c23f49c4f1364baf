//! Domain models and invariants.

pub mod config;
pub mod identity;
pub mod records;
pub mod response;
pub mod snapshot;
pub mod time;

pub use config::{
    KubeapiConfig, KubernetesConfig, RedisConfig, ServerConfig, SyncConfig, default_config_path,
};
pub use identity::ClusterIdentity;
pub use records::{NamespaceRecord, PortSpec, ServiceRecord, namespace_id, service_id};
pub use response::{ApiResponse, CODE_BAD_REQUEST, CODE_ERROR, CODE_OK};
pub use snapshot::{ClusterSnapshot, snapshot_key};
pub use time::{TIMESTAMP_FORMAT, format_timestamp, now_formatted};

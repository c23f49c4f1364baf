use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Process configuration, usually read from `configs/application.yml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct KubeapiConfig {
    pub server: ServerConfig,
    pub kubernetes: KubernetesConfig,
    pub redis: RedisConfig,
    pub sync: SyncConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: 8888 }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct KubernetesConfig {
    pub kubeconfig: Option<PathBuf>,
    #[serde(rename = "clusterID")]
    pub cluster_id: Option<String>,
    pub cluster_name: Option<String>,
    #[serde(rename = "clusterRegionID")]
    pub cluster_region_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RedisConfig {
    pub addr: String,
    pub password: Option<String>,
    pub database: i64,
    pub key_prefix: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SyncConfig {
    pub interval_secs: u64,
    pub call_timeout_secs: u64,
    pub ttl_secs: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            interval_secs: 60,
            call_timeout_secs: 10,
            ttl_secs: 3600,
        }
    }
}

impl SyncConfig {
    /// Every duration must be at least one second.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("sync.intervalSecs", self.interval_secs),
            ("sync.callTimeoutSecs", self.call_timeout_secs),
            ("sync.ttlSecs", self.ttl_secs),
        ] {
            if value == 0 {
                bail!("{name} must be greater than zero");
            }
        }
        Ok(())
    }
}

impl KubeapiConfig {
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config at {}", path.display()))?;
        Self::from_yaml(&raw)
            .with_context(|| format!("failed to parse config at {}", path.display()))
    }

    pub fn from_yaml(raw: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(raw)?;
        config.sync.validate()?;
        Ok(config)
    }
}

/// `KUBEAPI_CONFIG_PATH`, else `configs/application.yml` under the working
/// directory.
pub fn default_config_path() -> PathBuf {
    if let Ok(path) = std::env::var("KUBEAPI_CONFIG_PATH") {
        return PathBuf::from(path);
    }
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join("configs")
        .join("application.yml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"
server:
  port: 9090
kubernetes:
  kubeconfig: /etc/kube/config
  clusterID: c-123
  clusterName: prod
  clusterRegionID: eu-west-1
redis:
  addr: 127.0.0.1:6379
  password: secret
  database: 2
  keyPrefix: "kubeapi:cluster:"
"#;

    #[test]
    fn parses_full_config() {
        let config = KubeapiConfig::from_yaml(SAMPLE).unwrap();
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.kubernetes.cluster_id.as_deref(), Some("c-123"));
        assert_eq!(config.kubernetes.cluster_region_id.as_deref(), Some("eu-west-1"));
        assert_eq!(
            config.kubernetes.kubeconfig.as_deref(),
            Some(Path::new("/etc/kube/config"))
        );
        assert_eq!(config.redis.database, 2);
        assert_eq!(config.redis.key_prefix, "kubeapi:cluster:");
        assert_eq!(config.sync.interval_secs, 60);
        assert_eq!(config.sync.ttl_secs, 3600);
    }

    #[test]
    fn missing_sections_use_defaults() {
        let config = KubeapiConfig::from_yaml("redis:\n  addr: cache:6379\n").unwrap();
        assert_eq!(config.server.port, 8888);
        assert!(config.kubernetes.cluster_id.is_none());
        assert_eq!(config.sync.call_timeout_secs, 10);
    }

    #[test]
    fn zero_call_timeout_is_rejected() {
        let err = KubeapiConfig::from_yaml("sync:\n  callTimeoutSecs: 0\n").unwrap_err();
        assert_eq!(err.to_string(), "sync.callTimeoutSecs must be greater than zero");
    }

    #[test]
    fn zero_ttl_is_rejected() {
        let err = KubeapiConfig::from_yaml("sync:\n  ttlSecs: 0\n").unwrap_err();
        assert_eq!(err.to_string(), "sync.ttlSecs must be greater than zero");
    }

    #[test]
    fn zero_interval_is_rejected() {
        let err = KubeapiConfig::from_yaml("sync:\n  intervalSecs: 0\n").unwrap_err();
        assert_eq!(err.to_string(), "sync.intervalSecs must be greater than zero");
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        let config = KubeapiConfig::load_from_path(file.path()).unwrap();
        assert_eq!(config.kubernetes.cluster_name.as_deref(), Some("prod"));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = KubeapiConfig::load_from_path(Path::new("/nonexistent/application.yml"))
            .unwrap_err();
        assert!(err.to_string().contains("/nonexistent/application.yml"));
    }
}

//! Redis implementation of the snapshot cache port.

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, ConnectionAddr, ConnectionInfo, RedisConnectionInfo};
use std::time::Duration;
use tracing::info;

use kubeapi_domain::RedisConfig;
use kubeapi_ports::SnapshotCachePort;

const PING_TIMEOUT: Duration = Duration::from_secs(5);
const DEFAULT_PORT: u16 = 6379;

/// Snapshot store backed by a shared, auto-reconnecting redis connection.
#[derive(Clone)]
pub struct RedisSnapshotCache {
    conn: ConnectionManager,
}

impl RedisSnapshotCache {
    /// Opens the connection and checks it with a bounded `PING`.
    pub async fn connect(config: &RedisConfig) -> Result<Self> {
        let client = redis::Client::open(connection_info(config)?)
            .context("invalid redis configuration")?;
        let mut conn = tokio::time::timeout(PING_TIMEOUT, client.get_connection_manager())
            .await
            .context("timed out connecting to redis")?
            .context("failed to connect to redis")?;

        let ping = redis::cmd("PING");
        let pong: String = tokio::time::timeout(PING_TIMEOUT, ping.query_async(&mut conn))
            .await
            .context("timed out pinging redis")?
            .context("failed to ping redis")?;
        info!(addr = %config.addr, db = config.database, reply = %pong, "Connected to redis");

        Ok(Self { conn })
    }
}

/// Builds the connection parameters field by field so the password is
/// passed through verbatim instead of being embedded in a URL.
fn connection_info(config: &RedisConfig) -> Result<ConnectionInfo> {
    let addr = config.addr.trim().trim_start_matches("redis://").trim_end_matches('/');
    if addr.is_empty() {
        bail!("redis.addr configuration is required");
    }
    let (host, port) = match addr.rsplit_once(':') {
        Some((host, port)) => {
            let port = port
                .parse::<u16>()
                .with_context(|| format!("invalid port in redis.addr {addr}"))?;
            (host, port)
        }
        None => (addr, DEFAULT_PORT),
    };
    Ok(ConnectionInfo {
        addr: ConnectionAddr::Tcp(host.to_string(), port),
        redis: RedisConnectionInfo {
            db: config.database,
            password: config.password.clone().filter(|password| !password.is_empty()),
            ..Default::default()
        },
    })
}

/// Whole seconds for `EX`; redis rejects a zero expiry.
fn expiry_secs(ttl: Duration) -> u64 {
    ttl.as_secs().max(1)
}

#[async_trait]
impl SnapshotCachePort for RedisSnapshotCache {
    async fn set_with_ttl(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<()> {
        let mut conn = self.conn.clone();
        let _: () = conn
            .set_ex(key, value, expiry_secs(ttl))
            .await
            .with_context(|| format!("failed to SET {key}"))?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let mut conn = self.conn.clone();
        let value: Option<Vec<u8>> = conn
            .get(key)
            .await
            .with_context(|| format!("failed to GET {key}"))?;
        Ok(value)
    }
}

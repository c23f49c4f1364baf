use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::EnvFilter;

use kubeapi::{Services, redis_store, spawn_signal_listener};
use kubeapi_application::{Shutdown, SnapshotCache, shutdown_channel};
use kubeapi_domain::{ApiResponse, ClusterIdentity, KubeapiConfig, default_config_path};

#[derive(Parser)]
#[command(name = "kubeapi", version, about = "Cluster inventory sync service")]
struct Cli {
    /// Path to application.yml
    #[arg(long, env = "KUBEAPI_CONFIG_PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Publish the cluster snapshot to redis every interval until signalled
    Sync {
        /// Run a single pass and exit
        #[arg(long)]
        once: bool,
    },
    /// List active namespaces straight from the cluster
    Namespaces,
    /// List services in every namespace straight from the cluster
    Services,
    /// Print the snapshot currently cached in redis
    Snapshot {
        #[arg(long)]
        cluster_id: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config_path = cli.config.unwrap_or_else(default_config_path);
    let config = KubeapiConfig::load_from_path(&config_path)?;
    info!(path = %config_path.display(), "Loaded configuration");

    match cli.command {
        Command::Sync { once } => sync(config, once).await,
        Command::Namespaces => {
            let services = Services::connect(config).await?;
            print_envelope(&services.query().get_namespaces().await)
        }
        Command::Services => {
            let services = Services::connect(config).await?;
            print_envelope(&services.query().get_services().await)
        }
        Command::Snapshot { cluster_id } => snapshot(config, cluster_id).await,
    }
}

async fn sync(config: KubeapiConfig, once: bool) -> Result<ExitCode> {
    let store = redis_store(&config.redis).await?;
    let services = Services::connect(config).await?;
    let scheduler = services.scheduler(store);

    if once {
        let outcome = scheduler.sync_once(&Shutdown::never()).await?;
        info!(key = %outcome.key, services = outcome.services, "Snapshot published");
        return Ok(ExitCode::SUCCESS);
    }

    let (trigger, shutdown) = shutdown_channel();
    let listener = spawn_signal_listener(trigger);
    let stats = tokio::spawn(scheduler.run(shutdown))
        .await
        .context("sync scheduler task failed")?;
    listener.abort();
    info!(passes = stats.passes, failures = stats.failures, "Exiting");
    Ok(ExitCode::SUCCESS)
}

async fn snapshot(config: KubeapiConfig, cluster_id: Option<String>) -> Result<ExitCode> {
    let cluster_id = match cluster_id {
        Some(id) => id,
        None => ClusterIdentity::resolve(&config.kubernetes)?.cluster_id,
    };
    let store = redis_store(&config.redis).await?;
    let cache = SnapshotCache::new(store, config.redis.key_prefix.clone());
    let response = match cache.fetch(&cluster_id).await {
        Ok(Some(snapshot)) => ApiResponse::ok(snapshot),
        Ok(None) => ApiResponse::error(format!("no snapshot cached for cluster {cluster_id}")),
        Err(err) => ApiResponse::error(format!("{err:#}")),
    };
    print_envelope(&response)
}

fn print_envelope<T: Serialize>(response: &ApiResponse<T>) -> Result<ExitCode> {
    println!("{}", serde_json::to_string_pretty(response)?);
    Ok(if response.is_ok() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

use tokio::task::JoinHandle;
use tracing::{info, warn};

use kubeapi_application::ShutdownTrigger;

/// Fires `trigger` on the first SIGINT or SIGTERM.
pub fn spawn_signal_listener(trigger: ShutdownTrigger) -> JoinHandle<()> {
    tokio::spawn(async move {
        wait_for_signal().await;
        trigger.trigger();
    })
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    match signal(SignalKind::terminate()) {
        Ok(mut terminate) => {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => info!("Received SIGINT, shutting down"),
                _ = terminate.recv() => info!("Received SIGTERM, shutting down"),
            }
        }
        Err(err) => {
            warn!(error = %err, "Failed to install SIGTERM handler, waiting for SIGINT only");
            match tokio::signal::ctrl_c().await {
                Ok(()) => info!("Received SIGINT, shutting down"),
                Err(err) => {
                    warn!(error = %err, "Failed to listen for SIGINT");
                    std::future::pending::<()>().await;
                }
            }
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received Ctrl-C, shutting down"),
        Err(err) => {
            warn!(error = %err, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    }
}

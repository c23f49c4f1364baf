use std::sync::Arc;
use std::time::Duration;
use tokio::time::{Instant, MissedTickBehavior, interval_at, sleep};
use tracing::{debug, error, info};

use kubeapi_ports::IdentitySource;

use crate::assembler::SnapshotAssembler;
use crate::error::SyncError;
use crate::retry::{NextTick, RetryPolicy};
use crate::shutdown::Shutdown;
use crate::snapshot_cache::SnapshotCache;

/// Result of one successful assemble-and-publish pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassOutcome {
    pub key: String,
    pub cluster_name: String,
    pub namespaces: usize,
    pub services: usize,
}

/// Counters accumulated over the scheduler's lifetime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncStats {
    pub passes: u64,
    pub published: u64,
    pub failures: u64,
    pub cancelled: u64,
}

/// Runs sync passes back to back on a fixed period.
///
/// Passes execute inline in the scheduling loop, so a pass never starts
/// while another is running. Ticks that fire during a long pass are
/// skipped.
pub struct SyncScheduler {
    identity: Arc<dyn IdentitySource>,
    assembler: SnapshotAssembler,
    cache: SnapshotCache,
    period: Duration,
    retry: Box<dyn RetryPolicy>,
    consecutive_failures: u32,
}

impl SyncScheduler {
    pub fn new(
        identity: Arc<dyn IdentitySource>,
        assembler: SnapshotAssembler,
        cache: SnapshotCache,
        period: Duration,
    ) -> Self {
        Self {
            identity,
            assembler,
            cache,
            period,
            retry: Box::new(NextTick),
            consecutive_failures: 0,
        }
    }

    pub fn with_retry_policy(mut self, retry: impl RetryPolicy + 'static) -> Self {
        self.retry = Box::new(retry);
        self
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Syncs immediately, then once per period until `shutdown` fires.
    ///
    /// A pass that is already running when shutdown is requested finishes
    /// its publish before the loop exits.
    pub async fn run(mut self, mut shutdown: Shutdown) -> SyncStats {
        let mut stats = SyncStats::default();
        if shutdown.is_triggered() {
            info!("Shutdown requested before first sync");
            return stats;
        }

        info!(period_secs = self.period.as_secs(), "Sync scheduler started");
        let mut retry_in = self.run_pass(&shutdown, &mut stats).await;

        let mut ticker = interval_at(Instant::now() + self.period, self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            if shutdown.is_triggered() {
                break;
            }

            let early_retry = async move {
                match retry_in {
                    Some(delay) => sleep(delay).await,
                    None => std::future::pending::<()>().await,
                }
            };

            tokio::select! {
                biased;
                _ = shutdown.triggered() => break,
                _ = ticker.tick() => {}
                _ = early_retry => {
                    debug!(attempt = self.consecutive_failures + 1, "Retrying failed sync");
                }
            }

            retry_in = self.run_pass(&shutdown, &mut stats).await;
        }

        info!(
            passes = stats.passes,
            published = stats.published,
            failures = stats.failures,
            "Sync scheduler stopped"
        );
        stats
    }

    /// One resolve-assemble-publish pass, without scheduling.
    pub async fn sync_once(&self, shutdown: &Shutdown) -> Result<PassOutcome, SyncError> {
        let identity = self.identity.resolve().map_err(SyncError::Config)?;
        info!(cluster = %identity.cluster_name, "Starting sync");

        let snapshot = self.assembler.assemble(&identity, shutdown).await?;
        let key = self.cache.publish(&snapshot).await?;

        Ok(PassOutcome {
            key,
            cluster_name: identity.cluster_name,
            namespaces: snapshot.namespaces.len(),
            services: snapshot.services.len(),
        })
    }

    async fn run_pass(&mut self, shutdown: &Shutdown, stats: &mut SyncStats) -> Option<Duration> {
        stats.passes += 1;
        match self.sync_once(shutdown).await {
            Ok(outcome) => {
                stats.published += 1;
                self.consecutive_failures = 0;
                self.retry.on_success();
                info!(
                    cluster = %outcome.cluster_name,
                    key = %outcome.key,
                    namespaces = outcome.namespaces,
                    services = outcome.services,
                    "Sync completed"
                );
                None
            }
            Err(SyncError::Cancelled) => {
                stats.cancelled += 1;
                info!("Sync pass cancelled");
                None
            }
            Err(err) => {
                stats.failures += 1;
                self.consecutive_failures = self.consecutive_failures.saturating_add(1);
                error!(
                    error = %err,
                    consecutive_failures = self.consecutive_failures,
                    "Sync failed"
                );
                self.retry.on_failure(self.consecutive_failures)
            }
        }
    }
}

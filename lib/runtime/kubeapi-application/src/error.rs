use thiserror::Error;

/// Failure of one sync pass.
///
/// None of these stop the scheduler; they are logged and the next tick
/// tries again.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("configuration error: {0:#}")]
    Config(anyhow::Error),

    #[error("cluster API error: {0:#}")]
    Cluster(anyhow::Error),

    #[error("cache error: {0:#}")]
    Cache(anyhow::Error),

    #[error("failed to encode snapshot: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("sync cancelled")]
    Cancelled,
}

impl SyncError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, SyncError::Cancelled)
    }
}

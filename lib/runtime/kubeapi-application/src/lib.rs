//! Inventory sync core: assembly, scheduling, publishing and live queries.

pub mod assembler;
pub mod error;
pub mod mapping;
pub mod query;
pub mod retry;
pub mod scheduler;
pub mod shutdown;
pub mod snapshot_cache;

pub use assembler::{DEFAULT_CALL_TIMEOUT, SnapshotAssembler};
pub use error::SyncError;
pub use query::QueryService;
pub use retry::{ExponentialBackoff, NextTick, RetryPolicy};
pub use scheduler::{PassOutcome, SyncScheduler, SyncStats};
pub use shutdown::{Shutdown, ShutdownTrigger, shutdown_channel};
pub use snapshot_cache::{DEFAULT_SNAPSHOT_TTL, SnapshotCache};

//! Port traits between the sync core and its collaborators.

mod cache;
mod cluster;
mod identity;
#[cfg(any(test, feature = "test-support"))]
pub mod fake;

pub use cache::{InMemorySnapshotCache, SnapshotCachePort};
pub use cluster::ClusterReaderPort;
pub use identity::{ConfigIdentitySource, IdentitySource, StaticIdentity};

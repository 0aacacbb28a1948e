//! Snapshot cache trait.

use nugu_error::NuguResult;
use std::time::Duration;

/// Key-value cache holding serialized snapshots.
#[async_trait::async_trait]
pub trait SnapshotCache: Send + Sync {
    /// Read a blob; `None` if missing or expired.
    async fn get(&self, key: &str) -> NuguResult<Option<Vec<u8>>>;

    /// Store a blob that expires after `ttl`.
    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> NuguResult<()>;
}

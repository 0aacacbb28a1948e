//! One async mutex per guild.

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Lazily created per-guild locks.
///
/// The map's entry API inserts at most one lock per guild even when the
/// first events for a guild arrive concurrently. Guards are owned so no map
/// reference is held while waiting.
#[derive(Debug, Default)]
pub struct GuildLocks {
    locks: DashMap<u64, Arc<Mutex<()>>>,
}

impl GuildLocks {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The lock object for `guild_id`, created on first use.
    pub fn handle(&self, guild_id: u64) -> Arc<Mutex<()>> {
        self.locks
            .entry(guild_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Wait for and hold the guild's lock.
    pub async fn lock(&self, guild_id: u64) -> OwnedMutexGuard<()> {
        self.handle(guild_id).lock_owned().await
    }

    /// Number of guilds seen.
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    /// Whether no guild has been seen yet.
    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

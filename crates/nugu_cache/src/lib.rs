//! Snapshot caching with TTL support.
//!
//! Holds serialized snapshots (such as the full idol list) so a restart or
//! reload does not have to scan the whole store.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod cache;

pub use cache::{CacheEntry, MemoryCache, MemoryCacheConfig, MemoryCacheConfigBuilder};

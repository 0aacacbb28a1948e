//! Nugu - Discord bot for the nugu idol guessing game
//!
//! This crate assembles the workspace into the `nugu` binary: it loads
//! [`BotConfig`], installs logging, opens the stores and connects the
//! Discord client.
//!
//! # Cargo Features
//!
//! - `postgres` - persist collections to PostgreSQL instead of memory
//!
//! # Architecture
//!
//! - `nugu_error` - error types
//! - `nugu_core` - domain models
//! - `nugu_interface` - collaborator traits
//! - `nugu_imaging` - perceptual hashing and picture checks
//! - `nugu_cache` - snapshot cache
//! - `nugu_storage` - picture storage
//! - `nugu_database` - document stores
//! - `nugu_idols` - idol catalog, suggestion queue and game statistics
//! - `nugu_starboard` - starboard
//! - `nugu_social` - command routing and the Discord platform

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod app;
mod cli;
mod config;
mod logging;

pub use app::{Stores, open_catalog, recompute_stats, refresh_stats, run_bot};
pub use cli::{Cli, Commands};
pub use config::{
    BotConfig, DEFAULT_CONFIG_NAME, DatabaseConfig, DiscordConfig, ENV_PREFIX, LoggingConfig,
    StorageConfig,
};
pub use logging::{default_directive, init_logging};

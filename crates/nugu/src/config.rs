//! Bot configuration types and loading.
//!
//! Configuration comes from an optional TOML file overlaid with `NUGU_`
//! environment variables, where `__` separates nested keys:
//! `NUGU_DISCORD__TOKEN` sets `discord.token` and
//! `NUGU_SUGGESTIONS__CHANNEL_ID` sets `suggestions.channel_id`.

use config::{Config, Environment, File, FileFormat, Map};
use derive_getters::Getters;
use nugu_error::{ConfigError, NuguError, NuguResult};
use nugu_idols::{CatalogConfig, SuggestionConfig};
use nugu_starboard::StarboardConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

/// File looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_NAME: &str = "nugu";

/// Prefix of environment overrides.
pub const ENV_PREFIX: &str = "NUGU";

/// Discord connection settings.
#[derive(Clone, Serialize, Deserialize, Getters, derive_setters::Setters)]
#[setters(prefix = "with_")]
pub struct DiscordConfig {
    /// Bot token
    #[serde(default)]
    token: String,

    /// Prefix every chat command starts with
    #[serde(default = "default_command_prefix")]
    command_prefix: String,
}

fn default_command_prefix() -> String {
    "!".to_string()
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            command_prefix: default_command_prefix(),
        }
    }
}

impl std::fmt::Debug for DiscordConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscordConfig")
            .field("token_set", &!self.token.is_empty())
            .field("command_prefix", &self.command_prefix)
            .finish()
    }
}

impl DiscordConfig {
    /// The token, or a configuration error when none was given.
    ///
    /// # Errors
    ///
    /// Returns a config error when the token is empty.
    pub fn require_token(&self) -> NuguResult<&str> {
        if self.token.trim().is_empty() {
            Err(ConfigError::new(format!(
                "Missing Discord token (set discord.token or {}_DISCORD__TOKEN)",
                ENV_PREFIX
            )))?
        }
        Ok(self.token.trim())
    }
}

/// Object storage settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, derive_setters::Setters)]
#[setters(prefix = "with_")]
pub struct StorageConfig {
    /// Directory idol pictures are stored under
    #[serde(default = "default_storage_path")]
    base_path: PathBuf,
}

fn default_storage_path() -> PathBuf {
    PathBuf::from("./data/images")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            base_path: default_storage_path(),
        }
    }
}

/// Document store settings.
///
/// Without a URL, or in builds without the `postgres` feature, every
/// collection is kept in memory and lost on exit.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Getters, derive_setters::Setters)]
#[setters(prefix = "with_")]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    #[serde(default)]
    url: Option<String>,

    /// Connections kept in the pool
    #[serde(default = "default_pool_size")]
    pool_size: u32,
}

fn default_pool_size() -> u32 {
    10
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            pool_size: default_pool_size(),
        }
    }
}

impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("url_set", &self.url.is_some())
            .field("pool_size", &self.pool_size)
            .finish()
    }
}

/// Log output settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, derive_setters::Setters)]
#[setters(prefix = "with_")]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    level: String,

    /// Emit one JSON object per line
    #[serde(default)]
    json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

/// Complete bot configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Getters, derive_setters::Setters)]
#[setters(prefix = "with_")]
pub struct BotConfig {
    /// Discord connection
    #[serde(default)]
    discord: DiscordConfig,

    /// Suggestion queue
    #[serde(default)]
    suggestions: SuggestionConfig,

    /// Idol catalog
    #[serde(default)]
    catalog: CatalogConfig,

    /// Starboard defaults
    #[serde(default)]
    starboard: StarboardConfig,

    /// Picture storage
    #[serde(default)]
    storage: StorageConfig,

    /// Document stores
    #[serde(default)]
    database: DatabaseConfig,

    /// Log output
    #[serde(default)]
    logging: LoggingConfig,
}

impl BotConfig {
    /// Load configuration from `path` (or `./nugu.toml` when present) with
    /// environment overrides.
    ///
    /// # Errors
    ///
    /// Returns a config error if a given file is missing or any source
    /// cannot be parsed.
    #[instrument]
    pub fn load(path: Option<&Path>) -> NuguResult<Self> {
        let file = match path {
            Some(path) => File::from(path),
            None => File::with_name(DEFAULT_CONFIG_NAME).required(false),
        };
        debug!("Loading configuration");
        Self::build(Config::builder().add_source(file), None)
    }

    /// Parse a TOML document, then apply `NUGU_` overrides taken from `env`
    /// instead of the process environment.
    ///
    /// # Errors
    ///
    /// Returns a config error if the document or an override is invalid.
    pub fn from_toml_with_env(toml: &str, env: Map<String, String>) -> NuguResult<Self> {
        Self::build(
            Config::builder().add_source(File::from_str(toml, FileFormat::Toml)),
            Some(env),
        )
    }

    /// Parse a TOML document on its own.
    ///
    /// # Errors
    ///
    /// Returns a config error if the document is invalid.
    pub fn from_toml(toml: &str) -> NuguResult<Self> {
        Self::from_toml_with_env(toml, Map::new())
    }

    /// Suggestion settings with the Discord command prefix applied.
    pub fn suggestion_config(&self) -> SuggestionConfig {
        self.suggestions
            .clone()
            .with_command_prefix(self.discord.command_prefix.clone())
    }

    fn build(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
        env: Option<Map<String, String>>,
    ) -> NuguResult<Self> {
        let environment = Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
            .source(env);

        builder
            .add_source(environment)
            .build()
            .map_err(|e| {
                NuguError::from(ConfigError::new(format!(
                    "Failed to build configuration: {}",
                    e
                )))
            })?
            .try_deserialize()
            .map_err(|e| {
                NuguError::from(ConfigError::new(format!(
                    "Failed to parse configuration: {}",
                    e
                )))
            })
    }
}

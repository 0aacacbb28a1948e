//! Tracing subscriber setup.

use crate::config::LoggingConfig;
use nugu_error::{ConfigError, NuguResult};
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter directive used when `RUST_LOG` is unset.
///
/// `--verbose` raises the configured level to `debug`.
pub fn default_directive(config: &LoggingConfig, verbose: bool) -> String {
    if verbose {
        "debug".to_string()
    } else {
        config.level().clone()
    }
}

/// Install the global subscriber.
///
/// `RUST_LOG` wins over the configured level unless `verbose` is set.
///
/// # Errors
///
/// Returns a config error if the level is not a valid filter directive or a
/// subscriber is already installed.
pub fn init_logging(config: &LoggingConfig, verbose: bool) -> NuguResult<()> {
    let directive = default_directive(config, verbose);
    let env_filter = if verbose {
        EnvFilter::try_new(&directive)
    } else {
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&directive))
    }
    .map_err(|e| ConfigError::new(format!("Invalid log level '{}': {}", directive, e)))?;

    let fmt_layer = if *config.json() {
        tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_level(true)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_level(true)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| ConfigError::new(format!("Failed to install log subscriber: {}", e)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbose_overrides_level() {
        let config = LoggingConfig::default().with_level("warn".to_string());
        assert_eq!(default_directive(&config, false), "warn");
        assert_eq!(default_directive(&config, true), "debug");
    }
}

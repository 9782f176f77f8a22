//! Tracing subscriber setup.
//!
//! `syedra-core` only emits `tracing` events; binaries call [`init_tracing`]
//! once at startup to print them.

use tracing_subscriber::EnvFilter;

use crate::error::ConfigError;
use crate::settings::LoggingConfig;
use crate::validation::validate_filter;

/// Builds the filter for `config`, without consulting `RUST_LOG`.
pub fn build_filter(config: &LoggingConfig) -> Result<EnvFilter, ConfigError> {
    validate_filter(&config.filter)?;
    EnvFilter::try_new(&config.filter).map_err(|e| ConfigError::Logging(e.to_string()))
}

/// Installs a global `fmt` subscriber.
///
/// `RUST_LOG` overrides the configured filter when it is set and valid. Fails
/// with [`ConfigError::Logging`] if a global subscriber is already installed.
pub fn init_tracing(config: &LoggingConfig) -> Result<(), ConfigError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => build_filter(config)?,
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|e| ConfigError::Logging(e.to_string()))?;
    tracing::debug!(filter = %config.filter, "tracing initialised");
    Ok(())
}

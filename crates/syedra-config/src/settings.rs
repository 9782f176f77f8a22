//! Run configuration file format and operations.

use serde::{Deserialize, Serialize};
use std::path::Path;

use syedra_core::ExecuteOptions;

use crate::error::ConfigError;
use crate::validation::validate_run_config;

/// Settings for one scheduling session.
///
/// # TOML Format
///
/// ```toml
/// [scheduler]
/// max_wavefronts = 1000
///
/// [logging]
/// filter = "syedra_core=debug,info"
/// ```
///
/// Both sections are optional. A missing `max_wavefronts` means runs continue
/// until the diagram quiesces.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RunConfig {
    /// Scheduler limits.
    #[serde(default)]
    pub scheduler: SchedulerConfig,

    /// Log output.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// `[scheduler]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SchedulerConfig {
    /// Wavefront cap per run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_wavefronts: Option<usize>,
}

/// `[logging]` section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// `tracing_subscriber` filter directive. `RUST_LOG` takes precedence.
    #[serde(default = "default_filter")]
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
        }
    }
}

fn default_filter() -> String {
    "info".to_string()
}

impl RunConfig {
    /// Set the wavefront cap.
    pub fn with_max_wavefronts(mut self, max_wavefronts: usize) -> Self {
        self.scheduler.max_wavefronts = Some(max_wavefronts);
        self
    }

    /// Set the logging filter.
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.logging.filter = filter.into();
        self
    }

    /// Load and validate a configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        let config = Self::from_toml(&content)?;
        tracing::debug!(path = %path.display(), "loaded run config");
        Ok(config)
    }

    /// Load a configuration from `path`, or the defaults if no file exists
    /// there.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!(path = %path.display(), "no run config, using defaults");
            Ok(Self::default())
        }
    }

    /// Parse and validate a configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: RunConfig = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Save the configuration to a TOML file, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
        }

        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))?;
        Ok(())
    }

    /// Convert the configuration to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check the configuration for values serde accepts but the scheduler
    /// cannot use.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_run_config(self)?;
        Ok(())
    }

    /// Scheduler options for [`Graph::with_options`](syedra_core::Graph::with_options).
    pub fn execute_options(&self) -> ExecuteOptions {
        ExecuteOptions {
            max_wavefronts: self.scheduler.max_wavefronts,
        }
    }
}

//! Run configuration and logging setup for syedra block diagrams.
//!
//! This crate holds everything a binary driving a `syedra-core` graph needs
//! around the engine itself.
//!
//! # Features
//!
//! - **Run Config**: `[scheduler]` and `[logging]` sections in a TOML file
//! - **Validation**: Reject limits and filters the runtime cannot use
//! - **Paths**: Platform-specific config directory
//! - **Logging**: `tracing_subscriber` initialisation from the config
//!
//! # Example
//!
//! ```rust,no_run
//! use syedra_config::{RunConfig, default_config_path, init_tracing};
//! use syedra_core::Graph;
//!
//! let config = RunConfig::load_or_default(default_config_path()).unwrap();
//! init_tracing(&config.logging).unwrap();
//!
//! let graph: Graph<f64> = Graph::with_options(config.execute_options());
//! ```

mod error;
mod logging;
mod settings;

/// Platform-specific paths for configuration.
pub mod paths;

/// Run configuration validation.
pub mod validation;

pub use error::ConfigError;
pub use logging::{build_filter, init_tracing};
pub use paths::{default_config_path, ensure_user_config_dir, user_config_dir};
pub use settings::{LoggingConfig, RunConfig, SchedulerConfig};
pub use validation::{
    ValidationError, ValidationResult, validate_filter, validate_max_wavefronts,
    validate_run_config,
};

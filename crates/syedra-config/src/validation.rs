//! Run configuration validation.
//!
//! Checks what serde cannot: a zero wavefront limit would stop every run
//! before its first wavefront, and the logging filter must parse as a
//! `tracing_subscriber` directive.
//!
//! # Example
//!
//! ```rust
//! use syedra_config::{RunConfig, validate_run_config};
//!
//! let config = RunConfig::default();
//! assert!(validate_run_config(&config).is_ok());
//! ```

use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::settings::RunConfig;

/// Validation error types.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// `max_wavefronts = 0`.
    #[error("max_wavefronts must be at least 1")]
    ZeroWavefrontLimit,

    /// Blank logging filter.
    #[error("logging filter is empty")]
    EmptyFilter,

    /// Filter directive that does not parse.
    #[error("invalid logging filter '{filter}': {reason}")]
    InvalidFilter {
        /// The rejected directive.
        filter: String,
        /// Parser message.
        reason: String,
    },

    /// Multiple validation errors.
    #[error("multiple validation errors: {}", .0.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("; "))]
    Multiple(Vec<ValidationError>),
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validates the scheduler section.
pub fn validate_max_wavefronts(max_wavefronts: Option<usize>) -> ValidationResult<()> {
    match max_wavefronts {
        Some(0) => Err(ValidationError::ZeroWavefrontLimit),
        _ => Ok(()),
    }
}

/// Validates a logging filter directive.
pub fn validate_filter(filter: &str) -> ValidationResult<()> {
    if filter.trim().is_empty() {
        return Err(ValidationError::EmptyFilter);
    }
    EnvFilter::try_new(filter)
        .map(|_| ())
        .map_err(|e| ValidationError::InvalidFilter {
            filter: filter.to_string(),
            reason: e.to_string(),
        })
}

/// Validates a whole run configuration, collecting every failure.
pub fn validate_run_config(config: &RunConfig) -> ValidationResult<()> {
    let mut errors: Vec<ValidationError> = [
        validate_max_wavefronts(config.scheduler.max_wavefronts),
        validate_filter(&config.logging.filter),
    ]
    .into_iter()
    .filter_map(Result::err)
    .collect();

    match errors.len() {
        0 => Ok(()),
        1 => Err(errors.remove(0)),
        _ => Err(ValidationError::Multiple(errors)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_wavefront_limit_rejected() {
        assert_eq!(
            validate_max_wavefronts(Some(0)),
            Err(ValidationError::ZeroWavefrontLimit)
        );
        assert!(validate_max_wavefronts(Some(1)).is_ok());
        assert!(validate_max_wavefronts(None).is_ok());
    }

    #[test]
    fn test_filter_directives() {
        assert!(validate_filter("info").is_ok());
        assert!(validate_filter("syedra_core=debug,warn").is_ok());
        assert_eq!(validate_filter("  "), Err(ValidationError::EmptyFilter));
        assert!(matches!(
            validate_filter("syedra_core=loud"),
            Err(ValidationError::InvalidFilter { .. })
        ));
    }

    #[test]
    fn test_collects_multiple_errors() {
        let mut config = RunConfig::default();
        config.scheduler.max_wavefronts = Some(0);
        config.logging.filter = String::new();

        let err = validate_run_config(&config).unwrap_err();
        assert_eq!(
            err,
            ValidationError::Multiple(vec![
                ValidationError::ZeroWavefrontLimit,
                ValidationError::EmptyFilter,
            ])
        );
        assert!(err.to_string().starts_with("multiple validation errors: "));
    }

    #[test]
    fn test_single_error_unwrapped() {
        let mut config = RunConfig::default();
        config.scheduler.max_wavefronts = Some(0);
        assert_eq!(
            validate_run_config(&config),
            Err(ValidationError::ZeroWavefrontLimit)
        );
    }
}

//! Platform-specific paths for syedra configuration.
//!
//! - **User config**: `~/.config/syedra/` (Linux), `~/Library/Application Support/syedra/` (macOS), `%APPDATA%\syedra\` (Windows)
//! - **Run config file**: `syedra.toml` inside the user config directory
//!
//! # Example
//!
//! ```rust,no_run
//! use syedra_config::{RunConfig, paths};
//!
//! let config = RunConfig::load_or_default(paths::default_config_path()).unwrap();
//! println!("{:?}", config.execute_options());
//! ```

use std::path::PathBuf;

/// Application name used for directory paths.
const APP_NAME: &str = "syedra";

/// File name of the run configuration.
const CONFIG_FILE: &str = "syedra.toml";

/// Returns the user-specific configuration directory.
///
/// Returns a fallback path under the current directory if the platform
/// config directory cannot be determined.
pub fn user_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Returns the default run configuration file path.
pub fn default_config_path() -> PathBuf {
    user_config_dir().join(CONFIG_FILE)
}

/// Ensure the user config directory exists.
///
/// Creates the directory and any parent directories if they don't exist.
pub fn ensure_user_config_dir() -> Result<PathBuf, crate::ConfigError> {
    let dir = user_config_dir();

    if !dir.exists() {
        std::fs::create_dir_all(&dir).map_err(|e| crate::ConfigError::create_dir(&dir, e))?;
    }

    Ok(dir)
}

//! Configuration loading and credential resolution.
//!
//! Settings come from two places:
//!
//! 1. An optional JSON configuration file (Graph API version, logging).
//! 2. The process environment, which supplies the Facebook credentials.
//!
//! # Configuration File Locations
//!
//! 1. Path specified on the command line
//! 2. Default location, used only if it exists:
//!    - **Linux/macOS:** `~/.facebook-ads-mcp/config.json`
//!    - **Windows:** `%USERPROFILE%\.facebook-ads-mcp\config.json`
//!
//! # Environment
//!
//! `FACEBOOK_ACCESS_TOKEN`, `FACEBOOK_APP_ID`, `FACEBOOK_APP_SECRET` and
//! `FACEBOOK_ACCOUNT_ID` must all be set and non-empty.

mod credentials;
mod settings;

pub use credentials::{
    normalize_account_id, Credentials, ENV_ACCESS_TOKEN, ENV_ACCOUNT_ID, ENV_APP_ID, ENV_APP_SECRET,
};
pub use settings::{Config, GraphConfig, LoggingConfig};

use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Returns the default configuration directory.
///
/// - **Linux/macOS:** `~/.facebook-ads-mcp/`
/// - **Windows:** `%USERPROFILE%\.facebook-ads-mcp\`
#[must_use]
pub fn default_config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|p| p.join(".facebook-ads-mcp"))
}

/// Returns the platform-specific default configuration file path.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    default_config_dir().map(|p| p.join("config.json"))
}

/// Loads and parses the configuration file.
///
/// An explicit `path` must exist. With `None`, the default location is read
/// if present, otherwise built-in defaults are used.
///
/// # Errors
///
/// Returns an error if:
/// - An explicitly given file cannot be found
/// - The file cannot be read
/// - The JSON is malformed
/// - Fields are invalid
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(ConfigError::NotFound {
                    path: p.to_path_buf(),
                });
            }
            p.to_path_buf()
        }
        None => match default_config_path().filter(|p| p.exists()) {
            Some(p) => p,
            None => {
                let config = Config::default();
                config.validate()?;
                return Ok(config);
            }
        },
    };

    let contents = std::fs::read_to_string(&config_path).map_err(|e| ConfigError::ReadError {
        path: config_path.clone(),
        source: e,
    })?;

    let config: Config = serde_json::from_str(&contents).map_err(|e| ConfigError::ParseError {
        path: config_path.clone(),
        source: e,
    })?;

    config.validate()?;

    Ok(config)
}

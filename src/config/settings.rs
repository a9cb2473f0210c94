//! The settings file schema.
//!
//! Every section and field is optional; an empty object yields the defaults.

use serde::Deserialize;

use crate::error::ConfigError;

/// Parsed settings file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Editor schema hint, ignored.
    #[serde(rename = "$schema", default)]
    _schema: Option<String>,

    /// Free-form note, ignored.
    #[serde(rename = "_comment", default)]
    _comment: Option<String>,

    /// Graph API endpoint settings.
    #[serde(default)]
    pub graph: GraphConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Checks the Graph version and base URL.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] for a malformed version or a
    /// non-http(s) base URL.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let version = &self.graph.api_version;
        let well_formed = version
            .strip_prefix('v')
            .is_some_and(|rest| {
                let mut parts = rest.split('.');
                matches!(
                    (parts.next(), parts.next(), parts.next()),
                    (Some(major), Some(minor), None)
                        if !major.is_empty()
                            && !minor.is_empty()
                            && major.chars().all(|c| c.is_ascii_digit())
                            && minor.chars().all(|c| c.is_ascii_digit())
                )
            });
        if !well_formed {
            return Err(ConfigError::ValidationError {
                message: format!(
                    "Invalid Graph API version '{version}'. Expected the form vMAJOR.MINOR, e.g. v19.0"
                ),
            });
        }

        let base_url = &self.graph.base_url;
        if !(base_url.starts_with("https://") || base_url.starts_with("http://")) {
            return Err(ConfigError::ValidationError {
                message: format!("Invalid Graph API base URL '{base_url}'. Must be an http(s) URL"),
            });
        }

        Ok(())
    }
}

/// `graph` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GraphConfig {
    /// Graph API version segment, e.g. `v19.0`.
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Base URL of the Graph API, without the version segment.
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl GraphConfig {
    /// Returns the versioned endpoint, e.g. `https://graph.facebook.com/v19.0`.
    #[must_use]
    pub fn endpoint(&self) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), self.api_version)
    }
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            api_version: default_api_version(),
            base_url: default_base_url(),
        }
    }
}

fn default_api_version() -> String {
    "v19.0".to_string()
}

fn default_base_url() -> String {
    "https://graph.facebook.com".to_string()
}

/// `logging` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Default level when no `-v`/`-q` flag is given.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

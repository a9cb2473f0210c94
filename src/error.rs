//! Startup errors: the settings file and the Facebook credentials.
//!
//! Credential errors name environment variables only. Token and secret
//! values never reach a message.

use std::path::PathBuf;

use thiserror::Error;

/// Failure to assemble the server's configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The settings file exists but could not be read.
    #[error("cannot read settings file {path}")]
    ReadError {
        /// Settings file location.
        path: PathBuf,
        /// I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The settings file is not valid JSON for [`crate::config::Config`].
    #[error("malformed settings file {path}")]
    ParseError {
        /// Settings file location.
        path: PathBuf,
        /// JSON failure, including line and column.
        #[source]
        source: serde_json::Error,
    },

    /// An explicitly requested settings file does not exist.
    #[error("settings file {path} does not exist")]
    NotFound {
        /// The requested location.
        path: PathBuf,
    },

    /// A setting has an unusable value.
    #[error("invalid setting: {message}")]
    ValidationError {
        /// Which setting and why.
        message: String,
    },

    /// Credential variables are unset or blank.
    #[error("missing required Facebook credentials in environment: {}", .variables.join(", "))]
    MissingCredentials {
        /// The variables that were not usable.
        variables: Vec<&'static str>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_errors_name_the_path() {
        let err = ConfigError::NotFound {
            path: PathBuf::from("/etc/ads/settings.json"),
        };
        assert_eq!(
            err.to_string(),
            "settings file /etc/ads/settings.json does not exist"
        );
    }

    #[test]
    fn parse_errors_keep_their_source() {
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = ConfigError::ParseError {
            path: PathBuf::from("c.json"),
            source,
        };
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn missing_credentials_lists_variables() {
        let err = ConfigError::MissingCredentials {
            variables: vec!["FACEBOOK_ACCESS_TOKEN", "FACEBOOK_APP_SECRET"],
        };
        assert_eq!(
            err.to_string(),
            "missing required Facebook credentials in environment: \
             FACEBOOK_ACCESS_TOKEN, FACEBOOK_APP_SECRET"
        );
    }
}

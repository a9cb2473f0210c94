//! Facebook credentials resolved from the process environment.

use std::fmt;

use crate::error::ConfigError;

/// Environment variable holding the Graph API access token.
pub const ENV_ACCESS_TOKEN: &str = "FACEBOOK_ACCESS_TOKEN";
/// Environment variable holding the Facebook app id.
pub const ENV_APP_ID: &str = "FACEBOOK_APP_ID";
/// Environment variable holding the Facebook app secret.
pub const ENV_APP_SECRET: &str = "FACEBOOK_APP_SECRET";
/// Environment variable holding the ad account id (with or without `act_`).
pub const ENV_ACCOUNT_ID: &str = "FACEBOOK_ACCOUNT_ID";

/// Validated Facebook credentials.
///
/// All fields are guaranteed non-empty. The `Debug` impl redacts secrets.
#[derive(Clone)]
pub struct Credentials {
    access_token: String,
    app_id: String,
    app_secret: String,
    account_id: String,
}

impl Credentials {
    /// Reads credentials from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingCredentials`] naming every variable that
    /// is unset or blank.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds credentials from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingCredentials`] naming every variable that
    /// is unset or blank.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut missing = Vec::new();
        let mut fetch = |name: &'static str| {
            let value = lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty());
            if value.is_none() {
                missing.push(name);
            }
            value.unwrap_or_default()
        };

        let access_token = fetch(ENV_ACCESS_TOKEN);
        let app_id = fetch(ENV_APP_ID);
        let app_secret = fetch(ENV_APP_SECRET);
        let account_id = fetch(ENV_ACCOUNT_ID);

        if !missing.is_empty() {
            return Err(ConfigError::MissingCredentials { variables: missing });
        }

        Ok(Self {
            access_token,
            app_id,
            app_secret,
            account_id: normalize_account_id(&account_id),
        })
    }

    /// The Graph API access token.
    #[must_use]
    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    /// The Facebook app id.
    #[must_use]
    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    /// The Facebook app secret.
    #[must_use]
    pub fn app_secret(&self) -> &str {
        &self.app_secret
    }

    /// The ad account id, always carrying the `act_` prefix.
    #[must_use]
    pub fn account_id(&self) -> &str {
        &self.account_id
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_token", &"<redacted>")
            .field("app_id", &self.app_id)
            .field("app_secret", &"<redacted>")
            .field("account_id", &self.account_id)
            .finish()
    }
}

/// Ensures an ad account id carries the `act_` prefix the Graph API expects.
#[must_use]
pub fn normalize_account_id(id: &str) -> String {
    if id.starts_with("act_") {
        id.to_string()
    } else {
        format!("act_{id}")
    }
}

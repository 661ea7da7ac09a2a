//! Client configuration from environment variables.

use std::path::PathBuf;
use std::time::Duration;

use invoicer_domain::config::DEFAULT_REFRESH_WAIT;
use invoicer_domain::{ApiConfig, ClientCredentials, DomainError};

use crate::persistence::FileKeyValueStore;

/// Host of the token endpoint.
pub const ENV_BASE_URL: &str = "INVOICER_BASE_URL";
/// Host of the membership and invoice services.
pub const ENV_API_URL: &str = "INVOICER_API_URL";
/// OAuth client id.
pub const ENV_CLIENT_ID: &str = "INVOICER_CLIENT_ID";
/// OAuth client secret.
pub const ENV_CLIENT_SECRET: &str = "INVOICER_CLIENT_SECRET";
/// Seconds a request waits on another request's refresh.
pub const ENV_REFRESH_WAIT_SECS: &str = "INVOICER_REFRESH_WAIT_SECS";
/// Overrides the credentials file location.
pub const ENV_CREDENTIALS_FILE: &str = "INVOICER_CREDENTIALS_FILE";

/// Errors raised while reading the configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required variable is unset or empty.
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    /// A variable has an unusable value.
    #[error("invalid value for {name}: {message}")]
    Invalid {
        /// Variable name.
        name: &'static str,
        /// What is wrong with it.
        message: String,
    },

    /// The service URLs are malformed.
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// No config directory exists and no credentials file was given.
    #[error("could not determine config directory, set INVOICER_CREDENTIALS_FILE")]
    NoConfigDir,
}

/// Configuration read at start-up.
#[derive(Debug, Clone)]
pub struct EnvConfig {
    /// Service endpoints and client credentials.
    pub api: ApiConfig,
    /// Where credentials are persisted.
    pub credentials_file: PathBuf,
}

impl EnvConfig {
    /// Build the configuration from the process environment.
    ///
    /// | Variable                      | Required | Description                     |
    /// |-------------------------------|----------|---------------------------------|
    /// | `INVOICER_BASE_URL`           | yes      | host of the token endpoint      |
    /// | `INVOICER_API_URL`            | yes      | host of the API services        |
    /// | `INVOICER_CLIENT_ID`          | yes      | OAuth client id                 |
    /// | `INVOICER_CLIENT_SECRET`      | yes      | OAuth client secret             |
    /// | `INVOICER_REFRESH_WAIT_SECS`  | no (30)  | refresh waiter timeout          |
    /// | `INVOICER_CREDENTIALS_FILE`   | no       | credentials file location       |
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or malformed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let required = |name: &'static str| var(name).ok_or(ConfigError::Missing(name));

        let client =
            ClientCredentials::new(required(ENV_CLIENT_ID)?, required(ENV_CLIENT_SECRET)?);
        let refresh_wait = match var(ENV_REFRESH_WAIT_SECS) {
            None => DEFAULT_REFRESH_WAIT,
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .ok_or_else(|| ConfigError::Invalid {
                    name: ENV_REFRESH_WAIT_SECS,
                    message: format!("expected a positive number of seconds, got {raw:?}"),
                })?,
        };
        let api = ApiConfig::new(&required(ENV_BASE_URL)?, &required(ENV_API_URL)?, client)?
            .with_refresh_wait(refresh_wait);

        let credentials_file = var(ENV_CREDENTIALS_FILE)
            .map(PathBuf::from)
            .or_else(FileKeyValueStore::default_path)
            .ok_or(ConfigError::NoConfigDir)?;

        Ok(Self {
            api,
            credentials_file,
        })
    }
}

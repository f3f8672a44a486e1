//! Configuration loading via `ortho-config`.

use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;

use crate::client::{ApiToken, DEFAULT_API_BASE_URL};

/// Environment variables consulted for the API token, highest priority
/// first.
pub const TOKEN_ENV_VARS: [&str; 2] = ["DO_API_TOKEN", "DO_API_KEY"];

/// Provider settings derived from configuration files and environment
/// variables.
#[derive(Clone, Debug, Deserialize, OrthoConfig, PartialEq, Eq)]
#[ortho_config(
    prefix = "DO",
    discovery(
        app_name = "droplet",
        env_var = "DROPLET_CONFIG_PATH",
        config_file_name = "droplet.toml",
        dotfile_name = ".droplet.toml",
        project_file_name = "droplet.toml"
    )
)]
pub struct DigitalOceanConfig {
    /// Personal access token (`DO_API_TOKEN`).
    pub api_token: Option<String>,
    /// Legacy name for the same token (`DO_API_KEY`), used when
    /// `api_token` is unset.
    pub api_key: Option<String>,
    /// Versioned API base URL.
    #[ortho_config(default = DEFAULT_API_BASE_URL.to_owned())]
    pub api_base_url: String,
    /// Per-request timeout in seconds.
    #[ortho_config(default = 30)]
    pub request_timeout_secs: u64,
}

impl DigitalOceanConfig {
    /// Loads configuration without attempting to parse CLI arguments. Values
    /// merge defaults, configuration files, and environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the merge fails.
    pub fn load_without_cli_args() -> Result<Self, ConfigError> {
        Self::load_from_iter([std::ffi::OsString::from("droplet")])
            .map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Resolves the bearer token once, before any API call.
    ///
    /// An explicit value wins, then `DO_API_TOKEN`, then `DO_API_KEY`.
    /// Blank values count as missing.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingCredential`] when no source provides a
    /// token.
    pub fn resolve_token(&self, explicit: Option<&str>) -> Result<ApiToken, ConfigError> {
        [explicit, self.api_token.as_deref(), self.api_key.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|value| !value.is_empty())
            .map(ApiToken::new)
            .ok_or_else(|| {
                ConfigError::MissingCredential(format!(
                    "pass --api-token, set {} or {}, or add api_token to droplet.toml",
                    TOKEN_ENV_VARS[0], TOKEN_ENV_VARS[1]
                ))
            })
    }

    /// Returns the per-request timeout.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Performs semantic validation on fields with defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when the base URL is blank or the
    /// timeout is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_base_url.trim().is_empty() {
            return Err(ConfigError::Invalid(String::from(
                "api_base_url must not be empty: set DO_API_BASE_URL or api_base_url in droplet.toml",
            )));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid(String::from(
                "request_timeout_secs must be positive: set DO_REQUEST_TIMEOUT_SECS or request_timeout_secs in droplet.toml",
            )));
        }
        Ok(())
    }
}

/// Errors raised during configuration loading and validation.
#[derive(Debug, Error, Eq, PartialEq)]
pub enum ConfigError {
    /// No API token could be found.
    #[error("missing DigitalOcean API token: {0}")]
    MissingCredential(String),
    /// A configured value is unusable.
    #[error("invalid configuration: {0}")]
    Invalid(String),
    /// Surfaces errors from the `ortho-config` loader.
    #[error("configuration parsing failed: {0}")]
    Parse(String),
}

//! Client configuration
//!
//! [`ClientConfig`] can be deserialized from YAML or assembled with
//! [`ClientConfig::builder`]. Every field has a default, so an empty document
//! is a valid configuration.

use crate::error::{Error, Result, ResultExt};
use crate::http::{RateLimiterConfig, Timeout};
use crate::ids::{self, IdKind};
use crate::types::OptionStringExt;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use url::Url;

/// Environment variable consulted when no token is configured
pub const DEFAULT_TOKEN_ENV_VAR: &str = "AIRTABLE_AUTH_TOKEN";

/// Public Airtable API host
pub const DEFAULT_API_HOST: &str = "https://api.airtable.com";

/// API version path segment
pub const DEFAULT_API_VERSION: &str = "v0";

// ============================================================================
// Client Config
// ============================================================================

/// Settings for an [`AirtableClient`](crate::AirtableClient)
#[derive(Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// API token; falls back to `token_env_var` when unset
    #[serde(default, skip_serializing)]
    pub token: Option<String>,

    /// Environment variable holding the token
    #[serde(default = "default_token_env_var")]
    pub token_env_var: String,

    /// Scheme and host of the API
    #[serde(default = "default_api_host")]
    pub api_host: String,

    /// API version path segment
    #[serde(default = "default_version")]
    pub version: String,

    /// Connect/read limits
    #[serde(default)]
    pub timeout: TimeoutConfig,

    /// Client-side throttling; disabled when absent
    #[serde(default)]
    pub rate_limit: Option<RateLimiterConfig>,

    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_token_env_var() -> String {
    DEFAULT_TOKEN_ENV_VAR.to_string()
}

fn default_api_host() -> String {
    DEFAULT_API_HOST.to_string()
}

fn default_version() -> String {
    DEFAULT_API_VERSION.to_string()
}

fn default_user_agent() -> String {
    format!("airtable-client/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            token: None,
            token_env_var: default_token_env_var(),
            api_host: default_api_host(),
            version: default_version(),
            timeout: TimeoutConfig::default(),
            rate_limit: None,
            user_agent: default_user_agent(),
        }
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("token_env_var", &self.token_env_var)
            .field("api_host", &self.api_host)
            .field("version", &self.version)
            .field("timeout", &self.timeout)
            .field("rate_limit", &self.rate_limit)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

impl ClientConfig {
    /// Create a builder
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Parse a YAML document
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_yaml_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Versioned API root, e.g. `https://api.airtable.com/v0`
    pub fn api_root(&self) -> Result<String> {
        let host = Url::parse(&self.api_host)?;
        if !matches!(host.scheme(), "http" | "https") {
            return Err(Error::config(format!(
                "api_host must use http or https, got '{}'",
                host.scheme()
            )));
        }

        let version = self.version.trim_matches('/');
        if version.is_empty() {
            return Err(Error::missing_field("version"));
        }

        Ok(format!("{}/{}", self.api_host.trim_end_matches('/'), version))
    }

    /// The token to authenticate with
    ///
    /// An explicit `token` wins; otherwise `token_env_var` is read. Empty
    /// values count as missing. The result must be a valid API key.
    pub fn resolve_token(&self) -> Result<String> {
        let token = self
            .token
            .clone()
            .none_if_empty()
            .or_else(|| std::env::var(&self.token_env_var).ok().none_if_empty())
            .ok_or_else(|| Error::missing_field(self.token_env_var.as_str()))?;

        ids::validate(&token, IdKind::ApiKey)?;
        Ok(token)
    }

    /// Connect/read limits as a [`Timeout`]
    pub fn timeout(&self) -> Result<Timeout> {
        self.timeout.to_timeout()
    }
}

// ============================================================================
// Timeout Config
// ============================================================================

/// Timeouts in (fractional) seconds
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeoutConfig {
    /// Limit on establishing a connection
    #[serde(default)]
    pub connect_secs: Option<f64>,

    /// Limit on receiving the full response
    #[serde(default)]
    pub read_secs: Option<f64>,
}

impl TimeoutConfig {
    /// Convert to a [`Timeout`], rejecting negative or non-finite values
    pub fn to_timeout(&self) -> Result<Timeout> {
        Ok(Timeout {
            connect: seconds("timeout.connect_secs", self.connect_secs)?,
            read: seconds("timeout.read_secs", self.read_secs)?,
        })
    }
}

fn seconds(field: &str, value: Option<f64>) -> Result<Option<Duration>> {
    value
        .map(|secs| {
            Duration::try_from_secs_f64(secs)
                .map_err(|e| Error::config(format!("{field} = {secs}: {e}")))
        })
        .transpose()
}

// ============================================================================
// Builder
// ============================================================================

/// Builder for [`ClientConfig`]
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    /// Set the API token
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.config.token = Some(token.into());
        self
    }

    /// Read the token from a different environment variable
    pub fn token_env_var(mut self, name: impl Into<String>) -> Self {
        self.config.token_env_var = name.into();
        self
    }

    /// Set the API host
    pub fn api_host(mut self, host: impl Into<String>) -> Self {
        self.config.api_host = host.into();
        self
    }

    /// Set the API version segment
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.config.version = version.into();
        self
    }

    /// Set connect and read timeouts
    pub fn timeout(mut self, connect: Duration, read: Duration) -> Self {
        self.config.timeout = TimeoutConfig {
            connect_secs: Some(connect.as_secs_f64()),
            read_secs: Some(read.as_secs_f64()),
        };
        self
    }

    /// Enable throttling
    pub fn rate_limit(mut self, config: RateLimiterConfig) -> Self {
        self.config.rate_limit = Some(config);
        self
    }

    /// Set user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = agent.into();
        self
    }

    /// Build the config
    pub fn build(self) -> ClientConfig {
        self.config
    }
}

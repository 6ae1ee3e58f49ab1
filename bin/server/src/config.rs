//! Centralized server configuration.
//!
//! This module provides strongly-typed configuration for the server,
//! loaded via the `config` crate from environment variables. Nested fields
//! use `__` as the separator, e.g. `OIDC__CLIENT_ID` or `SESSION__SECRET`.
//!
//! See [`OidcConfig`](log_gateway_access::OidcConfig) for identity provider
//! settings.

use log_gateway_access::OidcConfig;
use log_gateway_logstore::{CloudWatchSettings, LogQuery, ReadDirection};
use serde::Deserialize;
use std::fmt;
use std::time::Duration;

/// Minimum length of the cookie signing secret, in bytes.
pub const MIN_SESSION_SECRET_LEN: usize = 64;

/// Upper bound CloudWatch accepts for `limit`.
const MAX_LOG_LIMIT: u32 = 10_000;

/// Server configuration composed from library configs.
#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    /// Address the HTTP listener binds to.
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// PostgreSQL connection URL. Sessions stay in memory when unset.
    #[serde(default)]
    pub database_url: Option<String>,

    /// Session configuration.
    pub session: SessionConfig,

    /// OIDC authentication configuration.
    pub oidc: OidcConfig,

    /// Log retrieval configuration.
    #[serde(default)]
    pub logs: LogsConfig,
}

fn default_listen_addr() -> String {
    "0.0.0.0:3001".to_string()
}

/// Session-related configuration.
#[derive(Clone, Deserialize)]
pub struct SessionConfig {
    /// Secret the session cookie is signed with.
    pub secret: String,

    /// Absolute session lifetime in hours.
    #[serde(default = "default_session_duration_hours")]
    pub duration_hours: i64,

    /// Interval between expired-session sweeps, in seconds.
    #[serde(default = "default_cleanup_interval_seconds")]
    pub cleanup_interval_seconds: u64,

    /// Whether to set the Secure flag on cookies (requires HTTPS).
    /// Defaults to true for production safety; set to false for local HTTP development.
    #[serde(default = "default_secure_cookies")]
    pub secure_cookies: bool,
}

fn default_session_duration_hours() -> i64 {
    24
}

fn default_cleanup_interval_seconds() -> u64 {
    300
}

fn default_secure_cookies() -> bool {
    true
}

impl SessionConfig {
    /// Returns the absolute session lifetime.
    #[must_use]
    pub fn ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.duration_hours)
    }
}

impl fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionConfig")
            .field("secret", &"<redacted>")
            .field("duration_hours", &self.duration_hours)
            .field("cleanup_interval_seconds", &self.cleanup_interval_seconds)
            .field("secure_cookies", &self.secure_cookies)
            .finish()
    }
}

/// Log retrieval configuration.
///
/// The query is fixed by the server; callers cannot choose the group,
/// stream, or limit.
#[derive(Debug, Clone, Deserialize)]
pub struct LogsConfig {
    /// AWS region for CloudWatch Logs; the AWS environment decides when unset.
    #[serde(default)]
    pub region: Option<String>,

    #[serde(default = "default_log_group")]
    pub log_group: String,

    #[serde(default = "default_log_stream")]
    pub log_stream: String,

    /// Maximum number of events per page.
    #[serde(default = "default_log_limit")]
    pub limit: u32,

    /// Read oldest events first.
    #[serde(default = "default_start_from_head")]
    pub start_from_head: bool,

    /// Reject anonymous callers of `/api/logs` with 401.
    #[serde(default)]
    pub require_auth: bool,

    /// Upper bound on one log store call, in seconds.
    #[serde(default = "default_log_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_log_group() -> String {
    "test".to_string()
}

fn default_log_stream() -> String {
    "custom".to_string()
}

fn default_log_limit() -> u32 {
    100
}

fn default_start_from_head() -> bool {
    true
}

fn default_log_timeout_seconds() -> u64 {
    10
}

impl Default for LogsConfig {
    fn default() -> Self {
        Self {
            region: None,
            log_group: default_log_group(),
            log_stream: default_log_stream(),
            limit: default_log_limit(),
            start_from_head: default_start_from_head(),
            require_auth: false,
            timeout_seconds: default_log_timeout_seconds(),
        }
    }
}

impl LogsConfig {
    /// The query every `/api/logs` request runs.
    #[must_use]
    pub fn query(&self) -> LogQuery {
        LogQuery::new(&self.log_group, &self.log_stream, self.limit).with_direction(
            ReadDirection::from_start_from_head(self.start_from_head),
        )
    }

    /// Settings for the CloudWatch client.
    #[must_use]
    pub fn cloudwatch_settings(&self) -> CloudWatchSettings {
        CloudWatchSettings {
            region: self.region.clone(),
            operation_timeout: Duration::from_secs(self.timeout_seconds),
        }
    }
}

impl ServerConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if required configuration is missing or invalid.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        let config: Self = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Checks values the type system cannot.
    ///
    /// # Errors
    ///
    /// Returns a message naming the first invalid setting.
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        self.oidc
            .validate()
            .map_err(|e| config::ConfigError::Message(e.to_string()))?;

        if self.session.secret.len() < MIN_SESSION_SECRET_LEN {
            return Err(config::ConfigError::Message(format!(
                "session.secret must be at least {MIN_SESSION_SECRET_LEN} bytes"
            )));
        }
        if self.session.duration_hours <= 0 {
            return Err(config::ConfigError::Message(
                "session.duration_hours must be positive".to_string(),
            ));
        }
        if self.session.cleanup_interval_seconds == 0 {
            return Err(config::ConfigError::Message(
                "session.cleanup_interval_seconds must be positive".to_string(),
            ));
        }
        if !(1..=MAX_LOG_LIMIT).contains(&self.logs.limit) {
            return Err(config::ConfigError::Message(format!(
                "logs.limit must be between 1 and {MAX_LOG_LIMIT}"
            )));
        }
        Ok(())
    }
}

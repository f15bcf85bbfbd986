//! Configuration loading and validation.
//!
//! Sources, lowest precedence first: built-in defaults, an optional TOML
//! file, `CDL__SECTION__KEY` environment variables, then the conventional
//! `DATABASE_URL` and `PORT` variables.

use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load config: {0}")]
    LoadError(#[from] ::config::ConfigError),

    #[error("Failed to render config: {0}")]
    RenderError(#[from] toml::ser::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// HTTP server configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Origins allowed to make cross-origin requests
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,

    /// Pre-built front-end bundle; not served when absent
    #[serde(default)]
    pub static_dir: Option<PathBuf>,

    /// Redirect plain-HTTP requests arriving through a proxy
    #[serde(default)]
    pub force_https: bool,

    /// Peers whose `X-Forwarded-For` header is believed. Empty means the
    /// header is ignored and clients are identified by peer address.
    #[serde(default)]
    pub trusted_proxies: Vec<IpAddr>,

    /// Deadline for single-row and listing queries
    #[serde(default = "default_standard_timeout")]
    pub standard_timeout_secs: u64,

    /// Deadline for per-player aggregates
    #[serde(default = "default_aggregate_timeout")]
    pub aggregate_timeout_secs: u64,

    /// Deadline for full-roster reports and the validation diagnostic
    #[serde(default = "default_report_timeout")]
    pub report_timeout_secs: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_allowed_origins() -> Vec<String> {
    vec![
        "https://cdlytics.me".to_string(),
        "http://localhost:3000".to_string(),
        "http://localhost:5173".to_string(),
    ]
}

fn default_standard_timeout() -> u64 {
    10
}

fn default_aggregate_timeout() -> u64 {
    15
}

fn default_report_timeout() -> u64 {
    30
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            allowed_origins: default_allowed_origins(),
            static_dir: None,
            force_https: false,
            trusted_proxies: Vec::new(),
            standard_timeout_secs: default_standard_timeout(),
            aggregate_timeout_secs: default_aggregate_timeout(),
            report_timeout_secs: default_report_timeout(),
        }
    }
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn timeouts(&self) -> QueryTimeouts {
        QueryTimeouts {
            standard: Duration::from_secs(self.standard_timeout_secs),
            aggregate: Duration::from_secs(self.aggregate_timeout_secs),
            report: Duration::from_secs(self.report_timeout_secs),
        }
    }
}

/// Per-tier query deadlines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryTimeouts {
    pub standard: Duration,
    pub aggregate: Duration,
    pub report: Duration,
}

impl Default for QueryTimeouts {
    fn default() -> Self {
        ServerConfig::default().timeouts()
    }
}

/// Relational store configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_url")]
    pub url: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,
}

fn default_database_url() -> String {
    "sqlite://cdl_stats.db".to_string()
}

fn default_max_connections() -> u32 {
    25
}

fn default_acquire_timeout() -> u64 {
    5
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            max_connections: default_max_connections(),
            acquire_timeout_secs: default_acquire_timeout(),
        }
    }
}

/// Which rows count towards season aggregates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsConfig {
    /// Tournaments that make up the season
    #[serde(default = "default_major_tournament_ids")]
    pub major_tournament_ids: Vec<i64>,

    /// Non-player accounts (coaches, staff) left out of listings
    #[serde(default = "default_excluded_gamertags")]
    pub excluded_gamertags: Vec<String>,

    /// Tournament whose discipline line is detailed in the player K/D report
    #[serde(default = "default_featured_tournament_id")]
    pub featured_tournament_id: i64,
}

fn default_major_tournament_ids() -> Vec<i64> {
    vec![1, 2, 3, 4, 5, 7]
}

fn default_excluded_gamertags() -> Vec<String> {
    vec!["Accuracy".to_string(), "Crimsix".to_string()]
}

fn default_featured_tournament_id() -> i64 {
    7
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            major_tournament_ids: default_major_tournament_ids(),
            excluded_gamertags: default_excluded_gamertags(),
            featured_tournament_id: default_featured_tournament_id(),
        }
    }
}

/// Per-client request limiting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateLimitConfig {
    #[serde(default = "default_rate_limit_enabled")]
    pub enabled: bool,

    #[serde(default = "default_max_requests")]
    pub max_requests: u32,

    #[serde(default = "default_window_secs")]
    pub window_secs: u64,
}

fn default_rate_limit_enabled() -> bool {
    true
}

fn default_max_requests() -> u32 {
    100
}

fn default_window_secs() -> u64 {
    60
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: default_rate_limit_enabled(),
            max_requests: default_max_requests(),
            window_secs: default_window_secs(),
        }
    }
}

impl RateLimitConfig {
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub stats: StatsConfig,

    #[serde(default)]
    pub rate_limit: RateLimitConfig,
}

impl AppConfig {
    /// Load from an optional TOML file layered under the environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = ::config::Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(
                ::config::File::from(path)
                    .format(::config::FileFormat::Toml)
                    .required(true),
            );
        }

        builder = builder
            .add_source(
                ::config::Environment::with_prefix("CDL")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("server.allowed_origins")
                    .with_list_parse_key("server.trusted_proxies")
                    .with_list_parse_key("stats.major_tournament_ids")
                    .with_list_parse_key("stats.excluded_gamertags"),
            )
            .set_override_option("database.url", std::env::var("DATABASE_URL").ok())?
            .set_override_option("server.port", std::env::var("PORT").ok())?;

        let config: AppConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML document directly, without consulting the environment.
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = ::config::Config::builder()
            .add_source(::config::File::from_str(
                contents,
                ::config::FileFormat::Toml,
            ))
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Effective configuration rendered as TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::ValidationError(
                "Server port must be greater than 0".to_string(),
            ));
        }

        let timeouts = [
            self.server.standard_timeout_secs,
            self.server.aggregate_timeout_secs,
            self.server.report_timeout_secs,
        ];
        if timeouts.contains(&0) {
            return Err(ConfigError::ValidationError(
                "Query timeouts must be greater than 0".to_string(),
            ));
        }

        if self.database.max_connections == 0 {
            return Err(ConfigError::ValidationError(
                "Database pool size must be greater than 0".to_string(),
            ));
        }

        if self.stats.major_tournament_ids.is_empty() {
            return Err(ConfigError::ValidationError(
                "At least one major tournament id is required".to_string(),
            ));
        }

        if self.rate_limit.enabled && self.rate_limit.window_secs == 0 {
            return Err(ConfigError::ValidationError(
                "Rate limit window must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

//! Application configuration structs
//!
//! Loads configuration from environment variables.

use std::env;

use super::StarboardConfig;

/// Main application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub app: AppSettings,
    pub starboard: StarboardConfig,
    pub gateway: GatewayConfig,
}

/// General application settings
#[derive(Debug, Clone)]
pub struct AppSettings {
    pub name: String,
    pub env: Environment,
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }

    /// Parse an environment name, case-insensitively
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "production" => Some(Self::Production),
            "staging" => Some(Self::Staging),
            "development" => Some(Self::Development),
            _ => None,
        }
    }
}

/// Connection settings for the chat platform the worker attaches to
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Redis instance carrying the platform's event fan-out
    pub redis_url: String,
    /// Base URL of the platform's REST API
    pub api_base_url: String,
    /// Token sent as `Authorization: Bot {token}`
    pub bot_token: Option<String>,
    pub request_timeout_secs: u64,
    pub reconnect_delay_ms: u64,
    pub event_buffer: usize,
}

// Default value functions
fn default_app_name() -> String {
    "starboard".to_string()
}

fn default_api_base_url() -> String {
    "http://127.0.0.1:3000/api/v1".to_string()
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_reconnect_delay_ms() -> u64 {
    1000
}

fn default_event_buffer() -> usize {
    1024
}

impl GatewayConfig {
    /// Load gateway settings through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            redis_url: lookup("REDIS_URL").ok_or(ConfigError::MissingVar("REDIS_URL"))?,
            api_base_url: lookup("API_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(default_api_base_url),
            bot_token: lookup("BOT_TOKEN").filter(|t| !t.trim().is_empty()),
            request_timeout_secs: lookup("REQUEST_TIMEOUT_SECS")
                .map(|s| {
                    s.parse()
                        .map_err(|_| ConfigError::InvalidValue("REQUEST_TIMEOUT_SECS", s))
                })
                .transpose()?
                .unwrap_or_else(default_request_timeout_secs),
            reconnect_delay_ms: lookup("RECONNECT_DELAY_MS")
                .and_then(|s| s.parse().ok())
                .unwrap_or_else(default_reconnect_delay_ms),
            event_buffer: lookup("EVENT_BUFFER")
                .and_then(|s| s.parse().ok())
                .unwrap_or_else(default_event_buffer),
        })
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if required environment variables are missing
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            app: AppSettings {
                name: lookup("APP_NAME").unwrap_or_else(default_app_name),
                env: lookup("APP_ENV")
                    .and_then(|s| Environment::parse(&s))
                    .unwrap_or_default(),
            },
            starboard: StarboardConfig::from_lookup(&lookup)?,
            gateway: GatewayConfig::from_lookup(&lookup)?,
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),

    #[error("Invalid configuration: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

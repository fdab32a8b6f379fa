//! Configuration structs

mod app_config;
mod starboard_config;

pub use app_config::{AppConfig, AppSettings, ConfigError, Environment, GatewayConfig};
pub use starboard_config::{ReactionPolicy, StarboardConfig, StarboardConfigBuilder};

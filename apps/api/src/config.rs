//! API configuration module.
//!
//! Configuration is loaded from environment variables with fallback to defaults.

use serde::{Deserialize, Serialize};
use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

/// API server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// HTTP port
    pub http_port: u16,

    /// Interface to bind
    pub bind_addr: IpAddr,

    /// SQLite database file
    pub database_path: String,

    /// Pool size for the database
    pub db_max_connections: u32,

    /// Allowed CORS origin; `*` allows any
    pub cors_origin: String,
}

impl ApiConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup (the environment in
    /// production, a map in tests).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let config = ApiConfig {
            http_port: parse_or(&lookup, "PIZZATRACK_HTTP_PORT", 8080)?,

            bind_addr: parse_or(&lookup, "PIZZATRACK_BIND_ADDR", IpAddr::from([0, 0, 0, 0]))?,

            database_path: lookup("PIZZATRACK_DB_PATH")
                .unwrap_or_else(|| "./pizzatrack.db".to_string()),

            db_max_connections: parse_or(&lookup, "PIZZATRACK_DB_MAX_CONN", 5)?,

            cors_origin: lookup("PIZZATRACK_CORS_ORIGIN").unwrap_or_else(|| "*".to_string()),
        };

        if config.db_max_connections == 0 {
            return Err(ConfigError::InvalidValue("PIZZATRACK_DB_MAX_CONN".to_string()));
        }
        if config.database_path.trim().is_empty() {
            return Err(ConfigError::MissingRequired("PIZZATRACK_DB_PATH".to_string()));
        }

        Ok(config)
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_addr, self.http_port)
    }
}

fn parse_or<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key.to_string())),
        None => Ok(default),
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}

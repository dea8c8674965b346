//! Server configuration.
//!
//! Configuration is loaded from `VANTAGE_*` environment variables with
//! defaults suitable for local development.

use std::net::SocketAddr;

use serde::{Deserialize, Serialize};
use vantage_core::{Error, Result};

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Address the HTTP server binds to.
    pub bind_addr: SocketAddr,
    /// Debug mode: header-based identity, pretty logs, admin seeding.
    pub debug: bool,
    /// Origins allowed by CORS; empty disables cross-origin access.
    pub cors_allowed_origins: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            debug: true,
            cors_allowed_origins: Vec::new(),
        }
    }
}

fn default_bind_addr() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 8080))
}

impl Config {
    /// Loads configuration from the environment.
    ///
    /// # Environment Variables
    ///
    /// - `VANTAGE_BIND_ADDR`: socket address, default `127.0.0.1:8080`
    /// - `VANTAGE_DEBUG`: `true`/`false`, default `true`
    /// - `VANTAGE_CORS_ALLOWED_ORIGINS`: comma-separated origins
    ///
    /// # Errors
    ///
    /// Returns an error when a variable is present but unparseable.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(addr) = std::env::var("VANTAGE_BIND_ADDR") {
            config.bind_addr = addr.parse().map_err(|_| {
                Error::invalid_input(format!("VANTAGE_BIND_ADDR is not a socket address: {addr}"))
            })?;
        }

        if let Ok(debug) = std::env::var("VANTAGE_DEBUG") {
            config.debug = parse_bool("VANTAGE_DEBUG", &debug)?;
        }

        if let Ok(origins) = std::env::var("VANTAGE_CORS_ALLOWED_ORIGINS") {
            config.cors_allowed_origins = origins
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(ToString::to_string)
                .collect();
        }

        Ok(config)
    }
}

fn parse_bool(name: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        other => Err(Error::invalid_input(format!(
            "{name} must be a boolean, got '{other}'"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_favour_local_development() {
        let config = Config::default();
        assert!(config.debug);
        assert_eq!(config.bind_addr.port(), 8080);
        assert!(config.cors_allowed_origins.is_empty());
    }

    #[test]
    fn bool_parsing_accepts_common_spellings() {
        assert!(parse_bool("X", "TRUE").unwrap());
        assert!(!parse_bool("X", "0").unwrap());
        assert!(parse_bool("X", "maybe").is_err());
    }
}

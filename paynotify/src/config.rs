//! Configuration module for environment variable parsing.
//!
//! All configuration is read once at startup. The payment provider server key
//! is the only required value; it is wrapped in [`ServerKey`] so it never shows
//! up in `Debug` output or logs.

use std::env;
use std::fmt;
use std::time::Duration;

use thiserror::Error;
use tracing::warn;

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("environment variable {0} is required")]
    Missing(&'static str),
}

/// Payment provider server key used to sign notifications.
#[derive(Clone)]
pub struct ServerKey(String);

impl ServerKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Access the raw key. Only the signature verifier should need this.
    pub fn reveal(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ServerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("****")
    }
}

impl fmt::Display for ServerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("****")
    }
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Midtrans server key used to verify notification signatures
    pub server_key: ServerKey,

    /// Port for the web server to listen on
    pub port: u16,

    /// SQLite connection URL. When unset, orders are kept in memory.
    pub database_url: Option<String>,

    /// Maximum number of pooled database connections
    pub database_max_connections: u32,

    /// Upper bound for a single order store call in milliseconds
    pub store_timeout_ms: u64,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let server_key = env::var("MIDTRANS_SERVER_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())
            .map(ServerKey::new)
            .ok_or(ConfigError::Missing("MIDTRANS_SERVER_KEY"))?;

        Ok(Config {
            server_key,

            port: parse_or("PORT", 3000),

            database_url: env::var("DATABASE_URL")
                .ok()
                .filter(|url| !url.trim().is_empty()),

            database_max_connections: parse_or("DATABASE_MAX_CONNECTIONS", 5),

            store_timeout_ms: parse_or("STORE_TIMEOUT_MS", 5000),
        })
    }

    /// Store call timeout as a [`Duration`].
    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }
}

/// Parse a numeric variable, falling back to `default` when unset or malformed.
fn parse_or<T>(name: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    let raw = match env::var(name) {
        Ok(v) => v,
        Err(_) => return default,
    };

    match raw.trim().parse::<T>() {
        Ok(value) => value,
        Err(_) => {
            warn!(env_var = name, value = %raw, "Invalid numeric value, using default");
            default
        }
    }
}

//! Configuration management for the server.

use std::env;
use std::path::PathBuf;

/// Default listening port of the user-states API.
pub const DEFAULT_PORT: u16 = 8005;

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host address
    pub host: String,
    /// Server port
    pub port: u16,
    /// Shared bearer secret; when unset, requests may be anonymous
    pub auth_secret: Option<String>,
    /// JSON file with the product catalog to load at startup
    pub catalog_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            auth_secret: None,
            catalog_path: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());

        let port = match env::var("PORT") {
            Ok(raw) => raw.parse().map_err(|_| ConfigError::InvalidPort(raw))?,
            Err(_) => DEFAULT_PORT,
        };

        let auth_secret = env::var("AUTH_SECRET").ok().filter(|s| !s.is_empty());
        let catalog_path = env::var("CATALOG_PATH").ok().map(PathBuf::from);

        Ok(Self {
            host,
            port,
            auth_secret,
            catalog_path,
        })
    }

    /// Address to bind, as `host:port`.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid PORT value: {0}")]
    InvalidPort(String),
}

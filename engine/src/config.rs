//! Client configuration loaded from environment variables.

use crate::{FileStore, LocalStore, MemoryStore};
use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Default base URL of the user-states API.
pub const DEFAULT_API_URL: &str = "http://localhost:8005";

/// Default bound on a single remote call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration for the engine's remote and local stores.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the user-states API
    pub api_url: String,
    /// Timeout applied to every gateway request
    pub request_timeout: Duration,
    /// Directory for persisted collections; in-memory when unset
    pub state_dir: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            request_timeout: DEFAULT_TIMEOUT,
            state_dir: None,
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// - `BASKET_API_URL` (default `http://localhost:8005`)
    /// - `BASKET_API_TIMEOUT_MS` (default 10000)
    /// - `BASKET_STATE_DIR` (unset keeps state in memory)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_url = lookup("BASKET_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());
        if api_url.trim().is_empty() {
            return Err(ConfigError::EmptyApiUrl);
        }

        let request_timeout = match lookup("BASKET_API_TIMEOUT_MS") {
            Some(raw) => {
                let millis: u64 = raw
                    .trim()
                    .parse()
                    .map_err(|_| ConfigError::InvalidTimeout(raw.clone()))?;
                if millis == 0 {
                    return Err(ConfigError::InvalidTimeout(raw));
                }
                Duration::from_millis(millis)
            }
            None => DEFAULT_TIMEOUT,
        };

        let state_dir = lookup("BASKET_STATE_DIR")
            .filter(|dir| !dir.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self {
            api_url,
            request_timeout,
            state_dir,
        })
    }

    /// Open the configured local store.
    pub fn open_store(&self) -> crate::error::Result<Arc<dyn LocalStore>> {
        match &self.state_dir {
            Some(dir) => Ok(Arc::new(FileStore::open(dir)?)),
            None => Ok(Arc::new(MemoryStore::new())),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("BASKET_API_URL must not be empty")]
    EmptyApiUrl,

    #[error("Invalid BASKET_API_TIMEOUT_MS value: {0}")]
    InvalidTimeout(String),
}

//! Core runtime configuration.
//!
//! Resolved once at process startup and passed to [`Database::open_with_config`].
//! Nothing in the request path reads the environment.
//!
//! [`Database::open_with_config`]: crate::db::Database::open_with_config

use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

/// Environment variable naming the database file.
pub const DATABASE_PATH_ENV: &str = "HEALTHCARE_DB_PATH";
/// Environment variable overriding the busy timeout, in milliseconds.
pub const BUSY_TIMEOUT_ENV: &str = "HEALTHCARE_DB_BUSY_TIMEOUT_MS";

/// SQLite's name for a private in-memory database.
pub const IN_MEMORY_PATH: &str = ":memory:";

pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),

    #[error("{key} has invalid value {value:?}")]
    Invalid { key: &'static str, value: String },
}

/// Core configuration resolved at startup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CoreConfig {
    database_path: PathBuf,
    busy_timeout: Duration,
}

impl CoreConfig {
    pub fn new(database_path: impl Into<PathBuf>) -> Self {
        Self {
            database_path: database_path.into(),
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
        }
    }

    pub fn in_memory() -> Self {
        Self::new(IN_MEMORY_PATH)
    }

    pub fn with_busy_timeout(mut self, busy_timeout: Duration) -> Self {
        self.busy_timeout = busy_timeout;
        self
    }

    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`, which maps a variable name to its value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let path = lookup(DATABASE_PATH_ENV)
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing(DATABASE_PATH_ENV))?;

        let mut config = Self::new(path.trim());

        if let Some(raw) = lookup(BUSY_TIMEOUT_ENV) {
            let millis: u64 = raw.trim().parse().map_err(|_| ConfigError::Invalid {
                key: BUSY_TIMEOUT_ENV,
                value: raw.clone(),
            })?;
            config = config.with_busy_timeout(Duration::from_millis(millis));
        }

        Ok(config)
    }

    pub fn database_path(&self) -> &Path {
        &self.database_path
    }

    pub fn busy_timeout(&self) -> Duration {
        self.busy_timeout
    }

    pub fn is_in_memory(&self) -> bool {
        self.database_path.as_os_str() == IN_MEMORY_PATH
    }
}

//! # Core Configuration Module
//!
//! Configuration for the song catalog core.
//!
//! ## Overview
//!
//! A `CoreConfig` is an explicit value handed to the bootstrap code; nothing
//! reads settings from globals after startup. It is built either through
//! [`CoreConfigBuilder`] or from `CATALOG_*` environment variables, and both
//! paths end in the same fail-fast validation.
//!
//! ## Environment
//!
//! | Variable | Required | Default |
//! |---|---|---|
//! | `CATALOG_DATABASE_URL` | yes | |
//! | `CATALOG_STORAGE_DIR` | yes | |
//! | `CATALOG_PUBLIC_BASE_URL` | no | `http://localhost:3000` |
//! | `CATALOG_STORAGE_TIMEOUT_SECS` | no | `10` |
//! | `CATALOG_MAX_CONNECTIONS` | no | `5` |
//! | `CATALOG_LOG_FORMAT` | no | `pretty` (debug) / `json` (release) |
//! | `CATALOG_LOG_LEVEL` | no | `info` |
//!
//! ## Usage
//!
//! ```no_run
//! use core_runtime::config::CoreConfig;
//! use std::time::Duration;
//!
//! let config = CoreConfig::builder()
//!     .database_url("sqlite:/var/lib/catalog/catalog.db")
//!     .storage_dir("/var/lib/catalog/objects")
//!     .storage_timeout(Duration::from_secs(5))
//!     .build()
//!     .expect("invalid catalog configuration");
//! ```

use crate::error::{Error, Result};
use crate::logging::{LogFormat, LoggingConfig};
use bridge_traits::time::LogLevel;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use url::Url;

pub const ENV_DATABASE_URL: &str = "CATALOG_DATABASE_URL";
pub const ENV_STORAGE_DIR: &str = "CATALOG_STORAGE_DIR";
pub const ENV_PUBLIC_BASE_URL: &str = "CATALOG_PUBLIC_BASE_URL";
pub const ENV_STORAGE_TIMEOUT_SECS: &str = "CATALOG_STORAGE_TIMEOUT_SECS";
pub const ENV_MAX_CONNECTIONS: &str = "CATALOG_MAX_CONNECTIONS";
pub const ENV_LOG_FORMAT: &str = "CATALOG_LOG_FORMAT";
pub const ENV_LOG_LEVEL: &str = "CATALOG_LOG_LEVEL";

pub const DEFAULT_PUBLIC_BASE_URL: &str = "http://localhost:3000";
pub const DEFAULT_STORAGE_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

const MAX_STORAGE_TIMEOUT: Duration = Duration::from_secs(300);
const MAX_POOL_CONNECTIONS: u32 = 100;

/// Core configuration for the song catalog.
///
/// Use [`CoreConfig::builder`] or [`CoreConfig::from_env`] to construct.
#[derive(Clone)]
pub struct CoreConfig {
    /// sqlx SQLite URL (`sqlite:<path>` or `sqlite::memory:`)
    pub database_url: String,

    /// Directory the local object store writes song files to
    pub storage_dir: PathBuf,

    /// Origin stored files are served from; object keys form the whole URL path
    pub public_base_url: String,

    /// Upper bound for every storage and object-store call
    pub storage_timeout: Duration,

    /// Connection pool size for file-backed databases
    pub max_connections: u32,

    pub logging: LoggingConfig,
}

impl fmt::Debug for CoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CoreConfig")
            .field("database_url", &self.database_url)
            .field("storage_dir", &self.storage_dir)
            .field("public_base_url", &mask_userinfo(&self.public_base_url))
            .field("storage_timeout", &self.storage_timeout)
            .field("max_connections", &self.max_connections)
            .field("log_format", &self.logging.format)
            .field("log_level", &self.logging.level)
            .finish()
    }
}

fn mask_userinfo(raw: &str) -> String {
    match Url::parse(raw) {
        Ok(mut url) if url.password().is_some() => {
            let _ = url.set_password(Some("***"));
            url.to_string()
        }
        _ => raw.to_string(),
    }
}

impl CoreConfig {
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }

    /// Load configuration from `CATALOG_*` environment variables.
    ///
    /// # Errors
    ///
    /// Fails when a required variable is missing, a value does not parse, or
    /// the resulting configuration does not validate.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    ///
    /// Blank values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let mut builder = Self::builder();

        if let Some(url) = get(ENV_DATABASE_URL) {
            builder = builder.database_url(url);
        }
        if let Some(dir) = get(ENV_STORAGE_DIR) {
            builder = builder.storage_dir(dir);
        }
        if let Some(base) = get(ENV_PUBLIC_BASE_URL) {
            builder = builder.public_base_url(base);
        }
        if let Some(raw) = get(ENV_STORAGE_TIMEOUT_SECS) {
            let secs: u64 = parse_setting(ENV_STORAGE_TIMEOUT_SECS, &raw)?;
            builder = builder.storage_timeout(Duration::from_secs(secs));
        }
        if let Some(raw) = get(ENV_MAX_CONNECTIONS) {
            builder = builder.max_connections(parse_setting(ENV_MAX_CONNECTIONS, &raw)?);
        }
        if let Some(raw) = get(ENV_LOG_FORMAT) {
            builder = builder.log_format(parse_setting(ENV_LOG_FORMAT, &raw)?);
        }
        if let Some(raw) = get(ENV_LOG_LEVEL) {
            builder = builder.log_level(parse_setting(ENV_LOG_LEVEL, &raw)?);
        }

        builder.build()
    }

    /// Validates the configuration.
    ///
    /// This checks:
    /// - The database URL is a SQLite URL
    /// - The storage directory is set
    /// - The public base URL is an absolute http(s) URL without a path
    /// - Timeout and pool size are within bounds
    pub fn validate(&self) -> Result<()> {
        if !self.database_url.starts_with("sqlite:") {
            return Err(Error::Config(format!(
                "Database URL must start with 'sqlite:' (got '{}'). \
                 Use sqlite:<path> for a file or sqlite::memory: for tests.",
                self.database_url
            )));
        }

        if self.storage_dir.as_os_str().is_empty() {
            return Err(Error::Config(
                "Storage directory cannot be empty".to_string(),
            ));
        }

        match Url::parse(&self.public_base_url) {
            Ok(url) if !matches!(url.path(), "" | "/") => {
                return Err(Error::Config(format!(
                    "Public base URL must not have a path (got '{}'). \
                     Object keys are recovered from the URL path of stored files.",
                    url.path()
                )))
            }
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            Ok(url) => {
                return Err(Error::Config(format!(
                    "Public base URL must use http or https (got '{}')",
                    url.scheme()
                )))
            }
            Err(e) => {
                return Err(Error::Config(format!(
                    "Public base URL is not a valid absolute URL: {}",
                    e
                )))
            }
        }

        if self.storage_timeout.is_zero() {
            return Err(Error::Config(
                "Storage timeout must be greater than 0 seconds".to_string(),
            ));
        }

        if self.storage_timeout > MAX_STORAGE_TIMEOUT {
            return Err(Error::Config(format!(
                "Storage timeout exceeds maximum of {} seconds",
                MAX_STORAGE_TIMEOUT.as_secs()
            )));
        }

        if self.max_connections == 0 || self.max_connections > MAX_POOL_CONNECTIONS {
            return Err(Error::Config(format!(
                "Max connections must be between 1 and {}",
                MAX_POOL_CONNECTIONS
            )));
        }

        Ok(())
    }
}

fn parse_setting<T>(key: &str, raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| Error::InvalidSetting {
        key: key.to_string(),
        message: e.to_string(),
    })
}

/// Builder for [`CoreConfig`]
#[derive(Debug, Default)]
pub struct CoreConfigBuilder {
    database_url: Option<String>,
    storage_dir: Option<PathBuf>,
    public_base_url: Option<String>,
    storage_timeout: Option<Duration>,
    max_connections: Option<u32>,
    logging: LoggingConfig,
}

impl CoreConfigBuilder {
    /// Sets the sqlx database URL (required).
    pub fn database_url(mut self, url: impl Into<String>) -> Self {
        self.database_url = Some(url.into());
        self
    }

    /// Sets the database URL from a file path.
    pub fn database_path(self, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        self.database_url(format!("sqlite:{}", path.display()))
    }

    /// Sets the object storage directory (required).
    pub fn storage_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.storage_dir = Some(dir.into());
        self
    }

    pub fn public_base_url(mut self, url: impl Into<String>) -> Self {
        self.public_base_url = Some(url.into());
        self
    }

    pub fn storage_timeout(mut self, timeout: Duration) -> Self {
        self.storage_timeout = Some(timeout);
        self
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = Some(max);
        self
    }

    pub fn log_format(mut self, format: LogFormat) -> Self {
        self.logging = self.logging.with_format(format);
        self
    }

    pub fn log_level(mut self, level: LogLevel) -> Self {
        self.logging = self.logging.with_level(level);
        self
    }

    /// Replaces the whole logging configuration.
    pub fn logging(mut self, logging: LoggingConfig) -> Self {
        self.logging = logging;
        self
    }

    /// Builds and validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] with an actionable message when a required
    /// value is missing or a value is out of range.
    pub fn build(self) -> Result<CoreConfig> {
        let database_url = self.database_url.ok_or_else(|| {
            Error::Config(format!(
                "Database URL is required. Use .database_url() or set {}.",
                ENV_DATABASE_URL
            ))
        })?;

        let storage_dir = self.storage_dir.ok_or_else(|| {
            Error::Config(format!(
                "Storage directory is required. Use .storage_dir() or set {}.",
                ENV_STORAGE_DIR
            ))
        })?;

        let config = CoreConfig {
            database_url,
            storage_dir,
            public_base_url: self
                .public_base_url
                .unwrap_or_else(|| DEFAULT_PUBLIC_BASE_URL.to_string()),
            storage_timeout: self.storage_timeout.unwrap_or(DEFAULT_STORAGE_TIMEOUT),
            max_connections: self.max_connections.unwrap_or(DEFAULT_MAX_CONNECTIONS),
            logging: self.logging,
        };

        config.validate()?;

        Ok(config)
    }
}

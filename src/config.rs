//! Service configuration loaded from environment variables.
//!
//! Every setting has a default so a bare environment yields a local
//! development configuration.

use crate::persistence::TransactionBudget;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Errors raised while reading configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A numeric setting could not be parsed.
    #[error("{key} must be a number, got '{value}'")]
    InvalidNumber {
        /// Environment variable name.
        key: &'static str,
        /// Raw value.
        value: String,
    },
    /// A required text setting is blank.
    #[error("{0} must not be empty")]
    Empty(&'static str),
    /// The database port is zero.
    #[error("POSTGRES_PORT must be between 1 and 65535")]
    InvalidPort,
    /// The pool size is zero.
    #[error("POSTGRES_POOL_SIZE must be at least 1")]
    InvalidPoolSize,
    /// The log level is not recognised.
    #[error("LOG_LEVEL must be one of debug, info, warn, error; got '{0}'")]
    InvalidLogLevel(String),
    /// The log format is not recognised.
    #[error("LOG_FORMAT must be json or text; got '{0}'")]
    InvalidLogFormat(String),
    /// A transaction deadline is zero.
    #[error("{0} must be greater than zero")]
    ZeroTimeout(&'static str),
}

/// Log verbosity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug and above.
    Debug,
    /// Info and above.
    Info,
    /// Warnings and errors.
    Warn,
    /// Errors only.
    Error,
}

impl LogLevel {
    /// Returns the filter directive for this level.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

impl TryFrom<&str> for LogLevel {
    type Error = ConfigError;

    fn try_from(value: &str) -> Result<Self, ConfigError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            _ => Err(ConfigError::InvalidLogLevel(value.to_owned())),
        }
    }
}

/// Log line encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// One JSON object per line.
    Json,
    /// Human-readable compact lines.
    Text,
}

impl TryFrom<&str> for LogFormat {
    type Error = ConfigError;

    fn try_from(value: &str) -> Result<Self, ConfigError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "text" => Ok(Self::Text),
            _ => Err(ConfigError::InvalidLogFormat(value.to_owned())),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogConfig {
    /// Verbosity.
    pub level: LogLevel,
    /// Encoding.
    pub format: LogFormat,
}

/// Database connection settings.
#[derive(Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    /// Server host.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Login role.
    pub user: String,
    /// Login password.
    pub password: String,
    /// Database name.
    pub name: String,
    /// libpq `sslmode` value.
    pub ssl_mode: String,
    /// Maximum pooled connections.
    pub pool_size: u32,
}

impl DatabaseConfig {
    /// Renders the connection URL.
    #[must_use]
    pub fn database_url(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}?sslmode={}",
            self.user, self.password, self.host, self.port, self.name, self.ssl_mode
        )
    }
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("name", &self.name)
            .field("ssl_mode", &self.ssl_mode)
            .field("pool_size", &self.pool_size)
            .finish()
    }
}

/// Complete service configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Database connection settings.
    pub database: DatabaseConfig,
    /// Logging settings.
    pub log: LogConfig,
    /// Transaction deadlines.
    pub transactions: TransactionBudget,
}

impl ServiceConfig {
    /// Reads configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a variable holds an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`, which maps variable names to
    /// values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a variable holds an invalid value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let text = |key: &'static str, default: &str| -> String {
            lookup(key).unwrap_or_else(|| default.to_owned())
        };

        let port = parse_number::<u16>("POSTGRES_PORT", &text("POSTGRES_PORT", "5432"))?;
        if port == 0 {
            return Err(ConfigError::InvalidPort);
        }
        let pool_size =
            parse_number::<u32>("POSTGRES_POOL_SIZE", &text("POSTGRES_POOL_SIZE", "10"))?;
        if pool_size == 0 {
            return Err(ConfigError::InvalidPoolSize);
        }

        let database = DatabaseConfig {
            host: non_empty("POSTGRES_HOST", &text("POSTGRES_HOST", "localhost"))?,
            port,
            user: text("POSTGRES_USER", "postgres"),
            password: text("POSTGRES_PASSWORD", "postgres"),
            name: non_empty("POSTGRES_DB", &text("POSTGRES_DB", "pr_reviewer"))?,
            ssl_mode: text("POSTGRES_SSLMODE", "disable"),
            pool_size,
        };
        let log = LogConfig {
            level: LogLevel::try_from(text("LOG_LEVEL", "info").as_str())?,
            format: LogFormat::try_from(text("LOG_FORMAT", "json").as_str())?,
        };
        let transactions = TransactionBudget::new(
            parse_timeout("TX_TIMEOUT_MS", &text("TX_TIMEOUT_MS", "5000"))?,
            parse_timeout("TX_BULK_TIMEOUT_MS", &text("TX_BULK_TIMEOUT_MS", "10000"))?,
        );

        Ok(Self {
            database,
            log,
            transactions,
        })
    }
}

fn parse_number<T: std::str::FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse::<T>()
        .map_err(|_| ConfigError::InvalidNumber {
            key,
            value: value.to_owned(),
        })
}

fn parse_timeout(key: &'static str, value: &str) -> Result<Duration, ConfigError> {
    let millis = parse_number::<u64>(key, value)?;
    if millis == 0 {
        return Err(ConfigError::ZeroTimeout(key));
    }
    Ok(Duration::from_millis(millis))
}

fn non_empty(key: &'static str, value: &str) -> Result<String, ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Empty(key));
    }
    Ok(trimmed.to_owned())
}

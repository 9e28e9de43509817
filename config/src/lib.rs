//! # Configuration Management for shopdb
//!
//! This crate provides the configuration structures consumed by the shopdb
//! bootstrap layer: connection settings, pool sizing and the run mode that
//! decides whether development-only diagnostics run.
//!
//! ## Quick Start
//!
//! ### Environment
//! ```text
//! DB_HOST=localhost
//! DB_NAME=shop
//! DB_USER=postgres
//! DB_PASS=secret
//! APP_ENV=development
//! # optional
//! DB_PORT=5432
//! DB_SYNC_CREATE_MISSING=false
//! ```
//!
//! ### TOML File Configuration
//! ```toml
//! mode = "development"
//! sync_create_missing = false
//!
//! [database]
//! host = "localhost"
//! port = 5432
//! database = "shop"
//! username = "postgres"
//! password = "secret"
//!
//! [pool]
//! max_connections = 5
//! min_connections = 0
//! acquire_timeout_seconds = 30
//! idle_timeout_seconds = 10
//! ```
//!
//! Load configuration:
//! ```rust,no_run
//! use config::AppConfig;
//!
//! // Environment (and .env), or the TOML file named by SHOPDB_CONFIG
//! let config = AppConfig::from_env()?;
//!
//! // Or load from an explicit path
//! let config = AppConfig::from_file("config/production.toml")?;
//! # Ok::<(), config::ConfigError>(())
//! ```

use serde::{Deserialize, Serialize};
use std::{env, fmt, path::Path, str::FromStr, time::Duration};
use thiserror::Error;

/// Environment variable naming a TOML file that takes precedence over
/// the individual `DB_*` variables.
pub const CONFIG_PATH_VAR: &str = "SHOPDB_CONFIG";

const DEFAULT_PORT: u16 = 5432;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Dotenvy error: {0}")]
    Dotenvy(#[from] dotenvy::Error),
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),
    #[error("Invalid value for {name}: {value:?}")]
    InvalidVar { name: &'static str, value: String },
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Whether the process runs with development diagnostics enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    Development,
    Production,
}

impl RunMode {
    /// Whether SQL statements are logged by the driver
    pub fn logs_statements(self) -> bool {
        self.is_development()
    }

    pub fn is_development(self) -> bool {
        matches!(self, RunMode::Development)
    }
}

impl FromStr for RunMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" => Ok(RunMode::Development),
            "production" => Ok(RunMode::Production),
            _ => Err(ConfigError::InvalidVar {
                name: "APP_ENV",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunMode::Development => f.write_str("development"),
            RunMode::Production => f.write_str("production"),
        }
    }
}

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub mode: RunMode,
    #[serde(default)]
    pub pool: PoolSettings,
    /// Create tables that are missing during development verification.
    /// Existing tables are never touched either way.
    #[serde(default)]
    pub sync_create_missing: bool,
}

/// Database connection settings
#[derive(Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub database: String,
    pub username: String,
    pub password: String,
}

/// Connection pool sizing and timeouts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolSettings {
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_seconds: u64,
    pub idle_timeout_seconds: u64,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_connections: 5,
            min_connections: 0,
            acquire_timeout_seconds: 30,
            idle_timeout_seconds: 10,
        }
    }
}

impl PoolSettings {
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_seconds)
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_seconds)
    }
}

impl AppConfig {
    /// Load configuration from the process environment.
    ///
    /// A `.env` file is read first if present. When `SHOPDB_CONFIG` is set the
    /// named TOML file is used instead of the `DB_*` variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                return Err(e.into());
            }
        }

        Self::resolve(|key| env::var(key).ok())
    }

    /// Prefer the TOML file named by `SHOPDB_CONFIG`, otherwise read the
    /// `DB_*` variables through `lookup`.
    pub fn resolve<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        match lookup(CONFIG_PATH_VAR) {
            Some(path) => Self::from_file(path),
            None => Self::from_lookup(lookup),
        }
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| lookup(name).ok_or(ConfigError::MissingVar(name));

        let host = required("DB_HOST")?;
        let database = required("DB_NAME")?;
        let username = required("DB_USER")?;
        let password = required("DB_PASS")?;
        let mode: RunMode = required("APP_ENV")?.parse()?;

        let port = match lookup("DB_PORT") {
            Some(value) => value.trim().parse().map_err(|_| ConfigError::InvalidVar {
                name: "DB_PORT",
                value,
            })?,
            None => DEFAULT_PORT,
        };

        let sync_create_missing = match lookup("DB_SYNC_CREATE_MISSING") {
            Some(value) => parse_flag("DB_SYNC_CREATE_MISSING", value)?,
            None => false,
        };

        let config = Self {
            database: DatabaseConfig::new(host, port, database, username, password),
            mode,
            pool: PoolSettings::default(),
            sync_create_missing,
        };

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database.host.is_empty() {
            return Err(ConfigError::Invalid(
                "Database host cannot be empty".to_string(),
            ));
        }
        if self.database.port == 0 {
            return Err(ConfigError::Invalid(
                "Database port cannot be zero".to_string(),
            ));
        }
        if self.database.database.is_empty() {
            return Err(ConfigError::Invalid(
                "Database name cannot be empty".to_string(),
            ));
        }
        if self.database.username.is_empty() {
            return Err(ConfigError::Invalid(
                "Database username cannot be empty".to_string(),
            ));
        }
        if self.pool.max_connections == 0 {
            return Err(ConfigError::Invalid(
                "Pool max_connections must be greater than 0".to_string(),
            ));
        }
        if self.pool.min_connections > self.pool.max_connections {
            return Err(ConfigError::Invalid(
                "Pool min_connections cannot be greater than max_connections".to_string(),
            ));
        }
        if self.pool.acquire_timeout_seconds == 0 {
            return Err(ConfigError::Invalid(
                "Pool acquire_timeout_seconds must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

fn parse_flag(name: &'static str, value: String) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" | "" => Ok(false),
        _ => Err(ConfigError::InvalidVar { name, value }),
    }
}

impl DatabaseConfig {
    /// Create a new database configuration
    pub fn new(
        host: String,
        port: u16,
        database: String,
        username: String,
        password: String,
    ) -> Self {
        Self {
            host,
            port,
            database,
            username,
            password,
        }
    }

    /// Connection string with the password masked, for logs
    pub fn redacted_connection_string(&self) -> String {
        format!(
            "postgresql://{}:***@{}:{}/{}",
            self.username, self.host, self.port, self.database
        )
    }
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

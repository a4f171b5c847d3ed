//! API server configuration.
//!
//! ## Sources (later wins)
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. Built-in defaults (serde `default = ...`)                          │
//! │  2. storekeep.toml in the working directory (optional)                 │
//! │  3. .env file, loaded into the process environment by dotenvy          │
//! │  4. STOREKEEP_* environment variables                                  │
//! │       STOREKEEP_PORT=9000                                              │
//! │       STOREKEEP_DATABASE_PATH=/var/lib/storekeep/storekeep.db          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::net::SocketAddr;
use std::time::Duration;

use config::{Config, Environment, File};
use serde::Deserialize;
use storekeep_db::DbConfig;

/// API server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Interface to bind
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP port
    #[serde(default = "default_port")]
    pub port: u16,

    /// SQLite database file
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Pool size
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// How long a writer waits on a locked database before giving up
    #[serde(default = "default_busy_timeout_secs")]
    pub busy_timeout_secs: u64,

    /// `EnvFilter` directives, used when `RUST_LOG` is unset
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_database_path() -> String {
    "storekeep.db".to_string()
}

fn default_max_connections() -> u32 {
    5
}

fn default_busy_timeout_secs() -> u64 {
    5
}

fn default_log_filter() -> String {
    "info,storekeep=debug,sqlx=warn".to_string()
}

impl ApiConfig {
    /// Loads configuration from file and environment.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let source = Config::builder()
            .add_source(File::with_name("storekeep").required(false))
            .add_source(Environment::with_prefix("STOREKEEP"))
            .build()?;

        Self::from_source(source)
    }

    /// Deserializes and validates an already built source.
    pub fn from_source(source: Config) -> Result<Self, ConfigError> {
        let config: ApiConfig = source.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::InvalidValue("port".to_string()));
        }
        if self.database_path.trim().is_empty() {
            return Err(ConfigError::InvalidValue("database_path".to_string()));
        }
        if self.max_connections == 0 {
            return Err(ConfigError::InvalidValue("max_connections".to_string()));
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|_| ConfigError::InvalidValue("host".to_string()))
    }

    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(&self.database_path)
            .max_connections(self.max_connections)
            .busy_timeout(Duration::from_secs(self.busy_timeout_secs))
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid value for {0}")]
    InvalidValue(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ApiConfig::from_source(Config::builder().build().unwrap()).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.database_path, "storekeep.db");
        assert_eq!(config.busy_timeout_secs, 5);
        assert_eq!(config.bind_addr().unwrap().port(), 8080);
    }

    #[test]
    fn test_overrides() {
        let source = Config::builder()
            .set_override("port", 9000)
            .unwrap()
            .set_override("host", "127.0.0.1")
            .unwrap()
            .set_override("max_connections", 2)
            .unwrap()
            .build()
            .unwrap();

        let config = ApiConfig::from_source(source).unwrap();
        assert_eq!(config.bind_addr().unwrap().to_string(), "127.0.0.1:9000");
        assert_eq!(config.max_connections, 2);
    }

    #[test]
    fn test_rejects_zero_pool() {
        let source = Config::builder()
            .set_override("max_connections", 0)
            .unwrap()
            .build()
            .unwrap();

        let err = ApiConfig::from_source(source).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(field) if field == "max_connections"));
    }

    #[test]
    fn test_bad_host() {
        let source = Config::builder()
            .set_override("host", "not a host")
            .unwrap()
            .build()
            .unwrap();

        let config = ApiConfig::from_source(source).unwrap();
        assert!(config.bind_addr().is_err());
    }
}

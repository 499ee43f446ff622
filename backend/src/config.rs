//! Runtime configuration loaded from environment variables.
//!
//! - `HOST` (default `0.0.0.0`), `PORT` (default `8080`)
//! - `STORAGE_MODE`: `memory` (default) | `redis` | `postgres`
//! - `REDIS_URL`: required when `STORAGE_MODE=redis`
//! - `DATABASE_URL`: required when `STORAGE_MODE=postgres`
//! - `DATABASE_MAX_CONNECTIONS` (default `5`)
//! - `CORS_ALLOWED_ORIGIN` (default `http://localhost:3000`)
//! - `STATIC_DIR`: optional directory served for non-API paths

use std::{net::SocketAddr, path::PathBuf, str::FromStr};

use axum::http::HeaderValue;
use thiserror::Error;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:3000";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid STORAGE_MODE `{0}` (expected memory, redis or postgres)")]
    InvalidStorageMode(String),

    #[error("REDIS_URL must be set when STORAGE_MODE=redis")]
    MissingRedisUrl,

    #[error("DATABASE_URL must be set when STORAGE_MODE=postgres")]
    MissingDatabaseUrl,

    #[error("invalid {name} `{value}`")]
    InvalidValue { name: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageMode {
    #[default]
    Memory,
    Redis,
    Postgres,
}

impl FromStr for StorageMode {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "memory" | "in_memory" | "inmemory" => Ok(Self::Memory),
            "redis" => Ok(Self::Redis),
            "postgres" | "postgresql" | "pg" => Ok(Self::Postgres),
            _ => Err(ConfigError::InvalidStorageMode(value.to_string())),
        }
    }
}

/// Storage backend selection along with its connection settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageConfig {
    Memory,
    Redis {
        url: String,
    },
    Postgres {
        url: String,
        max_connections: u32,
    },
}

impl StorageConfig {
    pub fn mode(&self) -> StorageMode {
        match self {
            Self::Memory => StorageMode::Memory,
            Self::Redis { .. } => StorageMode::Redis,
            Self::Postgres { .. } => StorageMode::Postgres,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub storage: StorageConfig,
    pub cors_origin: HeaderValue,
    pub static_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            storage: StorageConfig::Memory,
            cors_origin: HeaderValue::from_static(DEFAULT_CORS_ORIGIN),
            static_dir: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds a configuration from an arbitrary variable source.
    ///
    /// Blank values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mode = match var("STORAGE_MODE") {
            Some(value) => value.parse()?,
            None => StorageMode::default(),
        };

        let storage = match mode {
            StorageMode::Memory => StorageConfig::Memory,
            StorageMode::Redis => StorageConfig::Redis {
                url: var("REDIS_URL").ok_or(ConfigError::MissingRedisUrl)?,
            },
            StorageMode::Postgres => StorageConfig::Postgres {
                url: var("DATABASE_URL").ok_or(ConfigError::MissingDatabaseUrl)?,
                max_connections: parse_or(
                    "DATABASE_MAX_CONNECTIONS",
                    var("DATABASE_MAX_CONNECTIONS"),
                    DEFAULT_MAX_CONNECTIONS,
                )?,
            },
        };

        Ok(Self {
            host: var("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: parse_or("PORT", var("PORT"), DEFAULT_PORT)?,
            storage,
            cors_origin: match var("CORS_ALLOWED_ORIGIN") {
                Some(origin) => HeaderValue::from_str(&origin).map_err(|_| {
                    ConfigError::InvalidValue {
                        name: "CORS_ALLOWED_ORIGIN",
                        value: origin.clone(),
                    }
                })?,
                None => HeaderValue::from_static(DEFAULT_CORS_ORIGIN),
            },
            static_dir: var("STATIC_DIR").map(PathBuf::from),
        })
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|_| ConfigError::InvalidValue {
                name: "HOST",
                value: self.host.clone(),
            })
    }
}

fn parse_or<T: FromStr>(
    name: &'static str,
    value: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match value {
        Some(value) => value
            .parse()
            .map_err(|_| ConfigError::InvalidValue { name, value }),
        None => Ok(default),
    }
}

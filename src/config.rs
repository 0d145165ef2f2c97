//! Process configuration read from environment variables (after `.env` has
//! been loaded by `main`).

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use crate::http::cors::{AllowList, DEFAULT_ALLOWED_ORIGINS, DEFAULT_ALLOWED_SUFFIXES, split_list};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} has invalid value {value:?}: {reason}")]
    Invalid { name: &'static str, value: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostgresConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseConfig {
    Postgres(PostgresConfig),
    Sqlite { url: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat { Pretty, Json }

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind: SocketAddr,
    pub database: DatabaseConfig,
    pub pool_size: u32,
    pub allow_list: AllowList,
    pub static_dir: Option<PathBuf>,
    pub log_format: LogFormat,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from any variable source; unset and empty
    /// variables fall back to their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let host: IpAddr = parse_or(var("HOST"), "HOST", IpAddr::from([0, 0, 0, 0]))?;
        let port: u16 = parse_or(var("PORT"), "PORT", 3001)?;

        let database = match var("DATABASE_URL") {
            Some(url) if url.starts_with("sqlite:") => DatabaseConfig::Sqlite { url },
            Some(url) => {
                return Err(ConfigError::Invalid {
                    name: "DATABASE_URL",
                    value: url,
                    reason: "only sqlite: urls are accepted; configure postgres with DB_* variables".into(),
                })
            }
            None => DatabaseConfig::Postgres(PostgresConfig {
                host: var("DB_HOST").unwrap_or_else(|| "localhost".into()),
                port: parse_or(var("DB_PORT"), "DB_PORT", 5432)?,
                user: var("DB_USER").unwrap_or_else(|| "postgres".into()),
                password: lookup("DB_PASSWORD").unwrap_or_default(),
                name: var("DB_NAME").unwrap_or_else(|| "todo_app".into()),
            }),
        };

        let pool_size: u32 = parse_or(var("DB_POOL_SIZE"), "DB_POOL_SIZE", 10)?;
        if pool_size == 0 {
            return Err(ConfigError::Invalid { name: "DB_POOL_SIZE", value: "0".into(), reason: "must be at least 1".into() });
        }

        let origins = var("CORS_ALLOWED_ORIGINS").unwrap_or_else(|| DEFAULT_ALLOWED_ORIGINS.into());
        let suffixes = var("CORS_ALLOWED_ORIGIN_SUFFIXES").unwrap_or_else(|| DEFAULT_ALLOWED_SUFFIXES.into());
        let allow_list = AllowList::new(split_list(&origins), split_list(&suffixes));

        let log_format = match var("LOG_FORMAT").as_deref() {
            None | Some("pretty") => LogFormat::Pretty,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(ConfigError::Invalid { name: "LOG_FORMAT", value: other.into(), reason: "expected pretty or json".into() })
            }
        };

        Ok(Self {
            bind: SocketAddr::new(host, port),
            database,
            pool_size,
            allow_list,
            static_dir: var("STATIC_DIR").map(PathBuf::from),
            log_format,
        })
    }
}

fn parse_or<T>(raw: Option<String>, name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid { name, value, reason: e.to_string() }),
    }
}

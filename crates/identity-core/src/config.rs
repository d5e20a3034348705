use std::str::FromStr;

use anyhow::Context as _;

/// Database settings loaded from environment variables.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Connection URL (`postgres://…`, `sqlite::memory:`). Env var: `DATABASE_URL`.
    pub database_url: String,
    /// Pool size (default 10). Env var: `DATABASE_MAX_CONNECTIONS`.
    pub max_connections: u32,
    /// Connections kept open while idle (default 0). Env var: `DATABASE_MIN_CONNECTIONS`.
    pub min_connections: u32,
    /// Log every statement through sqlx (default false). Env var: `DATABASE_SQLX_LOGGING`.
    pub sqlx_logging: bool,
}

impl DatabaseConfig {
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            max_connections: 10,
            min_connections: 0,
            sqlx_logging: false,
        }
    }

    /// In-memory SQLite on a single pinned connection, so the database lives
    /// exactly as long as the pool.
    pub fn sqlite_in_memory() -> Self {
        Self {
            database_url: "sqlite::memory:".to_owned(),
            max_connections: 1,
            min_connections: 1,
            sqlx_logging: false,
        }
    }

    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL is not set")?;
        let defaults = Self::new(database_url);
        Ok(Self {
            max_connections: parse_or(
                std::env::var("DATABASE_MAX_CONNECTIONS").ok(),
                defaults.max_connections,
            ),
            min_connections: parse_or(
                std::env::var("DATABASE_MIN_CONNECTIONS").ok(),
                defaults.min_connections,
            ),
            sqlx_logging: parse_or(
                std::env::var("DATABASE_SQLX_LOGGING").ok(),
                defaults.sqlx_logging,
            ),
            ..defaults
        })
    }
}

/// Parse an optional env value, falling back to `default` when absent or malformed.
pub fn parse_or<T: FromStr>(value: Option<String>, default: T) -> T {
    value.and_then(|v| v.trim().parse().ok()).unwrap_or(default)
}

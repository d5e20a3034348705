use anyhow::Context as _;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection};

use crate::config::DatabaseConfig;

/// Open a connection pool for `config`.
///
/// Stores never open connections themselves; callers build one here and inject it.
pub async fn connect(config: &DatabaseConfig) -> anyhow::Result<DatabaseConnection> {
    let mut options = ConnectOptions::new(config.database_url.clone());
    options
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .sqlx_logging(config.sqlx_logging);

    let db = Database::connect(options)
        .await
        .context("connect to database")?;
    tracing::info!(
        backend = ?db.get_database_backend(),
        max_connections = config.max_connections,
        "database connected"
    );
    Ok(db)
}

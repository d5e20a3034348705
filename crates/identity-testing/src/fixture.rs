//! Migrated in-memory databases.

use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait as _;

use identity_core::config::DatabaseConfig;
use identity_core::db::connect;
use identity_store_migration::Migrator;

/// A private, fully migrated SQLite database.
///
/// Every `sqlite::memory:` pool is its own database, so two fixtures never
/// see each other's rows. The database lives as long as the pool's pinned
/// connection, i.e. until the fixture and all clones of [`conn`](Self::conn)
/// are dropped.
pub struct TestDatabase {
    pub db: DatabaseConnection,
}

impl TestDatabase {
    /// Connect and run all migrations.
    ///
    /// Panics if the database cannot be opened or migrated.
    pub async fn new() -> Self {
        identity_core::tracing::init_test_tracing();
        let db = connect(&DatabaseConfig::sqlite_in_memory())
            .await
            .expect("open in-memory sqlite");
        Migrator::up(&db, None).await.expect("run migrations");
        Self { db }
    }

    pub fn conn(&self) -> DatabaseConnection {
        self.db.clone()
    }
}

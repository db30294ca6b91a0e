//! In-memory SQLite test database
//!
//! Each `TestDatabase` owns a private in-memory database on a single pooled
//! connection, so tests never share state and need no container runtime.

use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;

pub struct TestDatabase {
    pub connection: DatabaseConnection,
}

impl TestDatabase {
    /// Fresh database with every migration of `M` applied
    pub async fn new<M: MigratorTrait>() -> Self {
        // One connection: every pooled connection to `:memory:` is its own database
        let mut options = ConnectOptions::new("sqlite::memory:");
        options
            .max_connections(1)
            .min_connections(1)
            .sqlx_logging(false);

        let connection = Database::connect(options)
            .await
            .expect("Failed to open in-memory SQLite database");

        connection
            .execute_unprepared("PRAGMA foreign_keys = ON;")
            .await
            .expect("Failed to enable foreign keys");

        M::up(&connection, None)
            .await
            .expect("Failed to run migrations");

        tracing::debug!("In-memory test database ready");

        Self { connection }
    }

    /// Cloned connection for handing to repositories
    pub fn connection(&self) -> DatabaseConnection {
        self.connection.clone()
    }
}

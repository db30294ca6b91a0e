/// Error type for connection management and schema operations
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    /// Errors surfaced by SeaORM
    #[cfg(feature = "postgres")]
    #[error("Database error: {0}")]
    Orm(#[from] sea_orm::DbErr),

    /// Connection failed after retries
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Health check failed
    #[error("Health check failed: {0}")]
    HealthCheckFailed(String),

    /// Migration error
    #[error("Migration error: {0}")]
    MigrationError(String),
}

/// Result type alias for database operations
pub type DatabaseResult<T> = Result<T, DatabaseError>;

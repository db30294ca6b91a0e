use sea_orm::{ConnectionTrait, DatabaseConnection, Statement};
use std::time::Instant;
use tracing::debug;

use crate::common::DatabaseError;

/// Run `SELECT 1` against the connection's backend
pub async fn check_health(db: &DatabaseConnection) -> Result<(), DatabaseError> {
    let backend = db.get_database_backend();
    debug!(?backend, "Running database health check");

    let stmt = Statement::from_string(backend, "SELECT 1".to_owned());
    db.query_one(stmt)
        .await
        .map_err(|e| DatabaseError::HealthCheckFailed(e.to_string()))?;

    Ok(())
}

/// Health check result with timing, for the CLI `check` command
#[derive(Debug, Clone)]
pub struct HealthStatus {
    pub healthy: bool,
    pub message: Option<String>,
    pub response_time_ms: u64,
}

impl HealthStatus {
    pub fn healthy(response_time_ms: u64) -> Self {
        Self {
            healthy: true,
            message: None,
            response_time_ms,
        }
    }

    pub fn unhealthy(message: String, response_time_ms: u64) -> Self {
        Self {
            healthy: false,
            message: Some(message),
            response_time_ms,
        }
    }
}

pub async fn check_health_detailed(db: &DatabaseConnection) -> HealthStatus {
    let start = Instant::now();
    let result = check_health(db).await;
    let elapsed = start.elapsed().as_millis() as u64;

    match result {
        Ok(()) => HealthStatus::healthy(elapsed),
        Err(e) => HealthStatus::unhealthy(e.to_string(), elapsed),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{ConnectOptions, Database};

    #[test]
    fn test_health_status_unhealthy() {
        let status = HealthStatus::unhealthy("connection refused".to_string(), 100);
        assert!(!status.healthy);
        assert_eq!(status.message.as_deref(), Some("connection refused"));
    }

    #[tokio::test]
    async fn test_check_health_on_sqlite() {
        let mut options = ConnectOptions::new("sqlite::memory:");
        options.max_connections(1);
        let db = Database::connect(options).await.unwrap();

        assert!(check_health(&db).await.is_ok());
        assert!(check_health_detailed(&db).await.healthy);
    }
}

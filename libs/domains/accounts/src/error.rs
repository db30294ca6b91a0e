use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AccountError {
    #[error("{0}")]
    InvalidArgument(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("User with email '{0}' already exists")]
    DuplicateEmail(String),

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type AccountResult<T> = Result<T, AccountError>;

impl AccountError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Map a failed write, surfacing a unique-constraint hit on `email` as a duplicate
    pub(crate) fn from_write(err: DbErr, email: &str) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => Self::DuplicateEmail(email.to_string()),
            _ => err.into(),
        }
    }
}

impl From<DbErr> for AccountError {
    fn from(err: DbErr) -> Self {
        Self::Internal(format!("Database error: {}", err))
    }
}

impl From<validator::ValidationErrors> for AccountError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::Validation(errors.to_string())
    }
}

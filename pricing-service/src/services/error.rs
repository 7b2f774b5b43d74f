use service_core::error::AppError;
use thiserror::Error;

use crate::utils::PasswordHashError;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Database error: {0}")]
    Database(anyhow::Error),

    #[error("Session store error: {0}")]
    Session(anyhow::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),

    #[error("Email already in use")]
    EmailInUse,

    #[error("User not found")]
    UserNotFound,

    #[error("Report not found")]
    ReportNotFound,

    #[error("Invalid credentials")]
    InvalidCredentials,

    // A hash that cannot be parsed is a data-integrity failure, never an
    // authentication outcome.
    #[error("Stored credential is corrupt: {0}")]
    CorruptPasswordHash(#[from] PasswordHashError),
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Database(e) => AppError::DatabaseError(e),
            ServiceError::Session(e) => AppError::InternalError(e),
            ServiceError::Internal(e) => AppError::InternalError(e),
            ServiceError::EmailInUse => AppError::Conflict(anyhow::anyhow!("Email already in use")),
            ServiceError::UserNotFound => AppError::NotFound(anyhow::anyhow!("User not found")),
            ServiceError::ReportNotFound => {
                AppError::NotFound(anyhow::anyhow!("Report not found"))
            }
            ServiceError::InvalidCredentials => {
                AppError::Unauthorized(anyhow::anyhow!("Invalid credentials"))
            }
            ServiceError::CorruptPasswordHash(e) => AppError::InternalError(anyhow::Error::new(e)),
        }
    }
}

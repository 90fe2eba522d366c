use service_core::error::AppError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Database error: {0}")]
    Database(#[from] mongodb::error::Error),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    InvalidReference(String),

    #[error("{0}")]
    Unauthenticated(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("{0}")]
    Forbidden(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Email already registered")]
    EmailAlreadyRegistered,

    #[error("{0}")]
    Conflict(String),
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Database(e) => AppError::DatabaseError(anyhow::Error::new(e)),
            ServiceError::Internal(e) => AppError::InternalError(e),
            ServiceError::Validation(msg) | ServiceError::InvalidReference(msg) => {
                AppError::BadRequest(anyhow::anyhow!(msg))
            }
            ServiceError::Unauthenticated(msg) => AppError::Unauthorized(anyhow::anyhow!(msg)),
            ServiceError::InvalidCredentials => {
                AppError::Unauthorized(anyhow::anyhow!("Invalid credentials"))
            }
            ServiceError::Forbidden(msg) => AppError::Forbidden(anyhow::anyhow!(msg)),
            e @ ServiceError::NotFound(_) => AppError::NotFound(anyhow::anyhow!(e.to_string())),
            ServiceError::EmailAlreadyRegistered => {
                AppError::Conflict(anyhow::anyhow!("Email already registered"))
            }
            ServiceError::Conflict(msg) => AppError::Conflict(anyhow::anyhow!(msg)),
        }
    }
}

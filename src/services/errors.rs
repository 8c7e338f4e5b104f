use thiserror::Error;

use crate::domain::types::TypeConstraintError;
use crate::forms::{FieldError, FormError};
use crate::repository::errors::RepositoryError;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{message}")]
    Validation {
        message: String,
        details: Vec<FieldError>,
    },

    #[error("Unauthorized")]
    Unauthenticated,

    #[error("Forbidden")]
    Forbidden,

    #[error("Not found")]
    NotFound,

    #[error("{0}")]
    Conflict(String),

    #[error("Database operation failed: {0}")]
    Database(String),

    #[error("Internal Server Error: {0}")]
    Internal(String),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    pub fn validation(message: impl Into<String>) -> Self {
        ServiceError::Validation {
            message: message.into(),
            details: Vec::new(),
        }
    }

    pub fn http_status(&self) -> u16 {
        match self {
            ServiceError::Validation { .. } => 400,
            ServiceError::Unauthenticated => 401,
            ServiceError::Forbidden => 403,
            ServiceError::NotFound => 404,
            ServiceError::Conflict(_) => 409,
            ServiceError::Database(_) | ServiceError::Internal(_) => 500,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::Validation { .. } => "VALIDATION_ERROR",
            ServiceError::Unauthenticated => "UNAUTHORIZED",
            ServiceError::Forbidden => "FORBIDDEN",
            ServiceError::NotFound => "NOT_FOUND",
            ServiceError::Conflict(_) => "CONFLICT",
            ServiceError::Database(_) => "DATABASE_ERROR",
            ServiceError::Internal(_) => "INTERNAL_SERVER_ERROR",
        }
    }

    /// Message safe to show to API callers. Storage internals stay in the logs.
    pub fn public_message(&self) -> String {
        match self {
            ServiceError::Database(_) => "Database operation failed".to_string(),
            ServiceError::Internal(_) => "Internal Server Error".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<RepositoryError> for ServiceError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => ServiceError::NotFound,
            RepositoryError::ConstraintViolation(message) => {
                log::warn!("Constraint violation: {message}");
                ServiceError::Conflict("A record with the same unique value already exists".into())
            }
            RepositoryError::ValidationError(message) => ServiceError::validation(message),
            RepositoryError::ConnectionError(message)
            | RepositoryError::DatabaseError(message)
            | RepositoryError::Unexpected(message) => ServiceError::Database(message),
        }
    }
}

impl From<TypeConstraintError> for ServiceError {
    fn from(err: TypeConstraintError) -> Self {
        ServiceError::validation(err.to_string())
    }
}

impl From<FormError> for ServiceError {
    fn from(err: FormError) -> Self {
        ServiceError::Validation {
            message: "Validation error".to_string(),
            details: err.field_errors(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repository_errors_map_to_statuses() {
        let cases = [
            (RepositoryError::NotFound, 404, "NOT_FOUND"),
            (
                RepositoryError::ConstraintViolation("customers.email".into()),
                409,
                "CONFLICT",
            ),
            (
                RepositoryError::ValidationError("fk".into()),
                400,
                "VALIDATION_ERROR",
            ),
            (
                RepositoryError::ConnectionError("pool".into()),
                500,
                "DATABASE_ERROR",
            ),
        ];

        for (err, status, code) in cases {
            let err = ServiceError::from(err);
            assert_eq!(err.http_status(), status);
            assert_eq!(err.code(), code);
        }
    }

    #[test]
    fn database_details_are_not_public() {
        let err = ServiceError::Database("no such table: customers".into());
        assert_eq!(err.public_message(), "Database operation failed");
    }
}

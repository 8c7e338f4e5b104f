use diesel::r2d2::{Error as R2D2Error, PoolError};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use thiserror::Error;

use crate::domain::types::TypeConstraintError;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Entity not found")]
    NotFound,

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Maps a failed statement. Uniqueness clashes are the only constraint
/// failures a caller can resolve, so they get their own variant.
impl From<DieselError> for RepositoryError {
    fn from(err: DieselError) -> Self {
        match err {
            DieselError::NotFound => RepositoryError::NotFound,
            DieselError::DatabaseError(kind, info) => {
                let message = info.message().to_string();
                match kind {
                    DatabaseErrorKind::UniqueViolation => RepositoryError::ConstraintViolation(
                        info.constraint_name()
                            .map(str::to_string)
                            .unwrap_or(message),
                    ),
                    DatabaseErrorKind::ForeignKeyViolation
                    | DatabaseErrorKind::NotNullViolation
                    | DatabaseErrorKind::CheckViolation => {
                        RepositoryError::ValidationError(format!("{kind:?}: {message}"))
                    }
                    _ => RepositoryError::DatabaseError(message),
                }
            }
            DieselError::SerializationError(e) | DieselError::QueryBuilderError(e) => {
                RepositoryError::ValidationError(e.to_string())
            }
            DieselError::DeserializationError(e) => {
                RepositoryError::DatabaseError(format!("Failed to read row: {e}"))
            }
            other @ (DieselError::RollbackTransaction | DieselError::BrokenTransactionManager) => {
                RepositoryError::DatabaseError(other.to_string())
            }
            other => RepositoryError::Unexpected(other.to_string()),
        }
    }
}

impl From<R2D2Error> for RepositoryError {
    fn from(err: R2D2Error) -> Self {
        RepositoryError::ConnectionError(err.to_string())
    }
}

impl From<PoolError> for RepositoryError {
    fn from(err: PoolError) -> Self {
        RepositoryError::ConnectionError(err.to_string())
    }
}

/// Rows that fail domain validation on the way out are corrupt data.
impl From<TypeConstraintError> for RepositoryError {
    fn from(err: TypeConstraintError) -> Self {
        RepositoryError::DatabaseError(format!("Invalid stored value: {err}"))
    }
}

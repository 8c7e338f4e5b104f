//! Request bodies accepted by the customer API.

use serde::{Deserialize, Deserializer};
use thiserror::Error;
use validator::{ValidationError, ValidationErrors};

pub use crate::dto::api::FieldError;
use crate::domain::types::{TypeConstraintError, is_valid_phone};

pub mod customer;
pub mod user;

#[derive(Debug, Error)]
/// Errors that can occur when processing request bodies.
pub enum FormError {
    #[error("validation errors: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("invalid {field}: {source}")]
    InvalidField {
        field: &'static str,
        source: TypeConstraintError,
    },
}

impl FormError {
    pub(crate) fn field(field: &'static str) -> impl FnOnce(TypeConstraintError) -> Self {
        move |source| FormError::InvalidField { field, source }
    }

    /// Flattens the error into per-field messages, ordered by field path.
    pub fn field_errors(&self) -> Vec<FieldError> {
        match self {
            FormError::Validation(errors) => {
                let mut details: Vec<FieldError> = errors
                    .field_errors()
                    .into_iter()
                    .flat_map(|(path, errors)| {
                        errors.iter().map(move |error| FieldError {
                            path: path.to_string(),
                            message: error
                                .message
                                .as_ref()
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| format!("invalid {path}")),
                        })
                    })
                    .collect();
                details.sort_by(|a, b| a.path.cmp(&b.path));
                details
            }
            FormError::InvalidField { field, source } => vec![FieldError {
                path: (*field).to_string(),
                message: source.to_string(),
            }],
        }
    }
}

/// Treats blank strings as absent values.
pub(crate) fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.filter(|v| !v.trim().is_empty()))
}

/// Like [`blank_as_none`] but keeps an explicit `null` or blank as `Some(None)`.
pub(crate) fn blank_as_cleared<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    blank_as_none(deserializer).map(Some)
}

pub(crate) fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    if is_valid_phone(phone.trim()) {
        Ok(())
    } else {
        Err(ValidationError::new("phone")
            .with_message("Phone may contain only digits, spaces and + - ( ) .".into()))
    }
}

pub(crate) fn validate_status(status: &str) -> Result<(), ValidationError> {
    status
        .parse::<crate::domain::types::CustomerStatus>()
        .map(|_| ())
        .map_err(|_| {
            ValidationError::new("status")
                .with_message("Status must be one of active, inactive, pending".into())
        })
}

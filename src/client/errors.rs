//! Failures surfaced by the sync layer and the messages shown for them.

use std::fmt::{Display, Formatter};

use thiserror::Error;

use crate::dto::api::{ApiErrorBody, FieldError};

/// What the caller was trying to do when a request failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Load,
    Create,
    Update,
    Delete,
}

impl Operation {
    fn verb(self) -> &'static str {
        match self {
            Operation::Load => "load",
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Delete => "delete",
        }
    }
}

impl Display for Operation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.verb())
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum SyncError {
    #[error("network error: {0}")]
    Network(String),

    #[error("request timed out")]
    Timeout,

    #[error("validation failed: {message}")]
    Validation {
        message: String,
        details: Vec<FieldError>,
    },

    #[error("not authenticated")]
    Unauthenticated,

    #[error("permission denied")]
    PermissionDenied,

    #[error("not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("server error: {0}")]
    Server(String),

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("another change to this record is still pending")]
    MutationPending,
}

impl SyncError {
    /// Maps a non-success HTTP status and its error body.
    pub fn from_status(status: u16, body: Option<ApiErrorBody>) -> Self {
        let message = body
            .as_ref()
            .map(|b| b.message.clone())
            .unwrap_or_else(|| format!("HTTP {status}"));

        match status {
            401 => SyncError::Unauthenticated,
            403 => SyncError::PermissionDenied,
            404 => SyncError::NotFound,
            409 => SyncError::Conflict(message),
            400..=499 => SyncError::Validation {
                details: body
                    .and_then(|b| b.details)
                    .and_then(|d| serde_json::from_value(d).ok())
                    .unwrap_or_default(),
                message,
            },
            _ => SyncError::Server(message),
        }
    }

    /// One distinct, human-readable message per failure class.
    pub fn user_message(&self, operation: Operation) -> String {
        match self {
            SyncError::Network(_) => format!(
                "Could not {operation} customers: the server is unreachable. Check your connection."
            ),
            SyncError::Timeout => {
                format!("Could not {operation} customers: the server took too long to respond.")
            }
            SyncError::Validation { message, .. } => {
                format!("Could not {operation} the customer: {message}")
            }
            SyncError::Unauthenticated => "Your session has expired. Please sign in again.".into(),
            SyncError::PermissionDenied => {
                format!("You do not have permission to {operation} customers.")
            }
            SyncError::NotFound => "This customer no longer exists.".into(),
            SyncError::Conflict(_) => "A customer with the same email already exists.".into(),
            SyncError::Server(_) => {
                format!("The server failed to {operation} customers. Please try again later.")
            }
            SyncError::MalformedResponse(_) => {
                format!("Received an unexpected response while trying to {operation} customers.")
            }
            SyncError::MutationPending => {
                "Please wait until the previous change to this customer is saved.".into()
            }
        }
    }
}

/// Failed optimistic mutation. Local state has already been rolled back.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("{message}")]
pub struct MutationError {
    pub operation: Operation,
    #[source]
    pub source: SyncError,
    pub message: String,
}

impl MutationError {
    pub fn new(operation: Operation, source: SyncError) -> Self {
        Self {
            message: source.user_message(operation),
            operation,
            source,
        }
    }
}

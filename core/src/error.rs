//! Error taxonomy for the contacts client.
//!
//! # Design
//! The variants separate the ways a request can fail from the caller's point
//! of view: the server was never reached (`Connectivity`), the server said no
//! (`Http`), the server said yes but the envelope was unusable
//! (`InvalidResponse`), or the input never left the client (`Validation`).
//! Screens render `user_message()`; logs use the `Display` form.

use crate::store::StoreError;
use crate::validation::FieldError;

/// Errors returned by the gateway, the auth service and the domain services.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// No response reached the client: DNS failure, refused connection, timeout.
    #[error("cannot connect to server: {hint}")]
    Connectivity { hint: String },

    /// The server answered with a non-2xx status. The body is not inspected.
    #[error("HTTP {status}")]
    Http { status: u16 },

    /// A 2xx response whose envelope failed the success/shape check.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Client-side rule violations, computed before any request is sent.
    #[error("{} field(s) failed validation", .0.len())]
    Validation(Vec<FieldError>),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// A 2xx response body was not valid JSON.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The persisted session could not be written or removed.
    #[error("session storage failed: {0}")]
    Storage(#[from] StoreError),
}

impl ApiError {
    /// Message suitable for a form-level error banner.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Connectivity { .. } => {
                "Cannot connect to server. Please make sure the backend is running.".to_string()
            }
            ApiError::Http { status: 401 } => "Please login again".to_string(),
            ApiError::Http { status: 404 } => "Data not found".to_string(),
            ApiError::Http { status: 500 } => "Server error - try again later".to_string(),
            ApiError::InvalidResponse(message) => message.clone(),
            ApiError::Validation(_) => "Please correct the highlighted fields".to_string(),
            ApiError::Http { .. }
            | ApiError::Serialization(_)
            | ApiError::Deserialization(_)
            | ApiError::Storage(_) => "Something went wrong. Please try again.".to_string(),
        }
    }

    /// Field-scoped violations, empty for every other variant.
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            ApiError::Validation(errors) => errors,
            _ => &[],
        }
    }

    /// Whether the server rejected the bearer token.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Http { status: 401 })
    }
}

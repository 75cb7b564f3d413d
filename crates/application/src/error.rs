//! Application-level errors

use domain::DomainError;
use thiserror::Error;

/// Errors that can occur in the application layer
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// Domain-level error
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Caller supplied malformed or incomplete input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// No usable credential was presented
    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    /// Credential is valid but may not reach the resource
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Route does not accept the inbound method
    #[error("Method {method} not allowed (route method: {allowed})")]
    MethodNotAllowed { method: String, allowed: String },

    /// Upstream could not be reached or did not answer
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApplicationError {
    /// Whether the error was caused by the caller's request
    pub const fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::Domain(_)
                | Self::InvalidInput(_)
                | Self::Unauthenticated(_)
                | Self::Forbidden(_)
                | Self::NotFound(_)
                | Self::MethodNotAllowed { .. }
        )
    }
}

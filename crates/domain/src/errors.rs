//! Domain-level errors

use thiserror::Error;

/// Errors that can occur in the domain layer
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    /// Latency bounds are inverted
    #[error("Invalid latency range: min {min_ms}ms is greater than max {max_ms}ms")]
    InvalidLatencyRange { min_ms: u64, max_ms: u64 },

    /// Status code cannot be rendered as an HTTP status
    #[error("Invalid status code: {0}")]
    InvalidStatusCode(String),

    /// Failure rate could not be interpreted
    #[error("Invalid failure rate: {0}")]
    InvalidFailureRate(String),

    /// HTTP method token is malformed
    #[error("Invalid HTTP method: {0}")]
    InvalidMethod(String),

    /// Entity identifier could not be parsed
    #[error("Invalid {entity_type} id: {value}")]
    InvalidIdentifier { entity_type: String, value: String },
}

impl DomainError {
    /// Create an invalid identifier error
    pub fn invalid_id(entity_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidIdentifier {
            entity_type: entity_type.into(),
            value: value.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_id_creates_correct_error() {
        let err = DomainError::invalid_id("collection", "abc");
        match err {
            DomainError::InvalidIdentifier { entity_type, value } => {
                assert_eq!(entity_type, "collection");
                assert_eq!(value, "abc");
            },
            _ => unreachable!("Expected InvalidIdentifier error"),
        }
    }

    #[test]
    fn invalid_id_error_message_is_correct() {
        let err = DomainError::invalid_id("collection", "abc");
        assert_eq!(err.to_string(), "Invalid collection id: abc");
    }

    #[test]
    fn invalid_latency_range_message() {
        let err = DomainError::InvalidLatencyRange {
            min_ms: 500,
            max_ms: 100,
        };
        assert_eq!(
            err.to_string(),
            "Invalid latency range: min 500ms is greater than max 100ms"
        );
    }

    #[test]
    fn invalid_status_code_message() {
        let err = DomainError::InvalidStatusCode("abc".to_string());
        assert_eq!(err.to_string(), "Invalid status code: abc");
    }

    #[test]
    fn invalid_method_message() {
        let err = DomainError::InvalidMethod("GE T".to_string());
        assert_eq!(err.to_string(), "Invalid HTTP method: GE T");
    }
}

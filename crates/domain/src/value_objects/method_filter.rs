//! HTTP method constraint attached to a route

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// Keyword stored for routes that accept every method
pub const ANY_METHOD: &str = "ANY";

/// Which inbound HTTP methods a route accepts
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum MethodFilter {
    /// Every method is accepted
    #[default]
    Any,
    /// Only the given method (stored upper-case)
    Only(String),
}

impl MethodFilter {
    /// Parse a stored method keyword
    ///
    /// Empty input and `ANY` (in any case) accept every method.
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let token = raw.trim();
        if token.is_empty() || token.eq_ignore_ascii_case(ANY_METHOD) {
            return Ok(Self::Any);
        }
        if !token.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(DomainError::InvalidMethod(raw.to_string()));
        }
        Ok(Self::Only(token.to_ascii_uppercase()))
    }

    /// Whether the inbound method is admitted, compared case-insensitively
    pub fn allows(&self, method: &str) -> bool {
        match self {
            Self::Any => true,
            Self::Only(expected) => expected.eq_ignore_ascii_case(method),
        }
    }

    /// Whether every method is accepted
    pub const fn is_any(&self) -> bool {
        matches!(self, Self::Any)
    }
}

impl fmt::Display for MethodFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str(ANY_METHOD),
            Self::Only(method) => f.write_str(method),
        }
    }
}

impl FromStr for MethodFilter {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<MethodFilter> for String {
    fn from(filter: MethodFilter) -> Self {
        filter.to_string()
    }
}

impl TryFrom<String> for MethodFilter {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn any_keyword_is_case_insensitive() {
        assert_eq!(MethodFilter::parse("any").unwrap(), MethodFilter::Any);
        assert_eq!(MethodFilter::parse("ANY").unwrap(), MethodFilter::Any);
        assert_eq!(MethodFilter::parse("").unwrap(), MethodFilter::Any);
    }

    #[test]
    fn verb_is_normalized_to_uppercase() {
        let filter = MethodFilter::parse("post").unwrap();
        assert_eq!(filter, MethodFilter::Only("POST".to_string()));
        assert_eq!(filter.to_string(), "POST");
    }

    #[test]
    fn only_filter_compares_case_insensitively() {
        let filter = MethodFilter::parse("GET").unwrap();
        assert!(filter.allows("GET"));
        assert!(filter.allows("get"));
        assert!(!filter.allows("POST"));
    }

    #[test]
    fn any_filter_allows_everything() {
        assert!(MethodFilter::Any.allows("DELETE"));
        assert!(MethodFilter::Any.is_any());
    }

    #[test]
    fn malformed_method_is_rejected() {
        assert!(MethodFilter::parse("GE T").is_err());
    }

    #[test]
    fn serde_uses_keyword_form() {
        let json = serde_json::to_string(&MethodFilter::Any).unwrap();
        assert_eq!(json, "\"ANY\"");
        let parsed: MethodFilter = serde_json::from_str("\"put\"").unwrap();
        assert_eq!(parsed, MethodFilter::Only("PUT".to_string()));
    }
}

//! Chaos policy: how much latency to add and how often to fail
//!
//! # Examples
//!
//! ```
//! use domain::{ChaosPolicy, FailureRate, LatencyRange};
//!
//! let policy = ChaosPolicy::new(
//!     FailureRate::from_percent(10),
//!     LatencyRange::new(100, 300).unwrap(),
//!     vec![502, 503, 502],
//! )
//! .unwrap();
//!
//! // Duplicate codes collapse, order is kept
//! assert_eq!(policy.error_codes(), &[502, 503]);
//! ```

use serde::{Deserialize, Serialize};

use super::{FailureRate, LatencyRange};
use crate::errors::DomainError;

/// Error codes used when a stored route configures none
pub const DEFAULT_ERROR_CODES: [u16; 2] = [500, 503];

/// Error code used when a policy has no codes at all
pub const FALLBACK_ERROR_CODE: u16 = 500;

/// Chaos configuration applied to a proxied request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChaosPolicy {
    failure_rate: FailureRate,
    latency: LatencyRange,
    error_codes: Vec<u16>,
}

impl ChaosPolicy {
    /// Create a chaos policy
    ///
    /// Error codes are deduplicated keeping their first occurrence.
    ///
    /// # Errors
    ///
    /// Returns an error if a code lies outside `100..=999`.
    pub fn new(
        failure_rate: FailureRate,
        latency: LatencyRange,
        error_codes: Vec<u16>,
    ) -> Result<Self, DomainError> {
        if let Some(bad) = error_codes.iter().find(|c| !is_valid_status(**c)) {
            return Err(DomainError::InvalidStatusCode(bad.to_string()));
        }
        Ok(Self {
            failure_rate,
            latency,
            error_codes: dedup_ordered(error_codes),
        })
    }

    /// Policy that forwards untouched
    pub fn passthrough() -> Self {
        Self::default()
    }

    /// Replace an empty error code list with [`DEFAULT_ERROR_CODES`]
    #[must_use]
    pub fn with_default_error_codes(mut self) -> Self {
        if self.error_codes.is_empty() {
            self.error_codes = DEFAULT_ERROR_CODES.to_vec();
        }
        self
    }

    /// Probability of injecting a failure
    pub const fn failure_rate(&self) -> FailureRate {
        self.failure_rate
    }

    /// Latency bounds
    pub const fn latency(&self) -> LatencyRange {
        self.latency
    }

    /// Candidate status codes for injected failures
    pub fn error_codes(&self) -> &[u16] {
        &self.error_codes
    }

    /// Whether neither latency nor failures are configured
    pub fn is_passthrough(&self) -> bool {
        self.latency.is_zero() && self.failure_rate.is_disabled()
    }
}

/// Whether a code can be sent as an HTTP status line
pub const fn is_valid_status(code: u16) -> bool {
    matches!(code, 100..=999)
}

fn dedup_ordered(codes: Vec<u16>) -> Vec<u16> {
    let mut out = Vec::with_capacity(codes.len());
    for code in codes {
        if !out.contains(&code) {
            out.push(code);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passthrough_has_no_chaos() {
        let policy = ChaosPolicy::passthrough();
        assert!(policy.is_passthrough());
        assert!(policy.error_codes().is_empty());
    }

    #[test]
    fn default_error_codes_fill_empty_list() {
        let policy = ChaosPolicy::passthrough().with_default_error_codes();
        assert_eq!(policy.error_codes(), &[500, 503]);
    }

    #[test]
    fn default_error_codes_keep_configured_list() {
        let policy = ChaosPolicy::new(FailureRate::disabled(), LatencyRange::none(), vec![429])
            .unwrap()
            .with_default_error_codes();
        assert_eq!(policy.error_codes(), &[429]);
    }

    #[test]
    fn out_of_range_codes_are_rejected() {
        let err =
            ChaosPolicy::new(FailureRate::disabled(), LatencyRange::none(), vec![503, 42])
                .unwrap_err();
        assert_eq!(err, DomainError::InvalidStatusCode("42".to_string()));
        assert!(
            ChaosPolicy::new(FailureRate::disabled(), LatencyRange::none(), vec![1000]).is_err()
        );
    }

    #[test]
    fn latency_alone_is_not_passthrough() {
        let policy =
            ChaosPolicy::new(FailureRate::disabled(), LatencyRange::fixed(50), vec![]).unwrap();
        assert!(!policy.is_passthrough());
    }

    #[test]
    fn status_validity_bounds() {
        assert!(is_valid_status(100));
        assert!(is_valid_status(599));
        assert!(is_valid_status(999));
        assert!(!is_valid_status(99));
        assert!(!is_valid_status(1000));
    }
}

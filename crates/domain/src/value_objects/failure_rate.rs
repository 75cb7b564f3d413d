//! Probability of injecting a synthetic failure
//!
//! Stored routes keep the rate as an integer percentage while the sandbox
//! takes a fraction. Both are normalized here to a fraction in `[0, 1]` so
//! that a single comparison against a uniform `[0, 1)` draw decides.
//!
//! # Examples
//!
//! ```
//! use domain::FailureRate;
//!
//! let stored = FailureRate::from_percent(25);
//! let sandbox = FailureRate::from_fraction(0.25).unwrap();
//! assert_eq!(stored, sandbox);
//!
//! assert!(FailureRate::from_percent(-5).is_disabled());
//! assert!(FailureRate::from_percent(100).is_certain());
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// Failure injection probability, normalized to a fraction
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FailureRate(f64);

impl FailureRate {
    /// Never inject failures
    pub const fn disabled() -> Self {
        Self(0.0)
    }

    /// Build from an integer percentage, clamped to `[0, 100]`
    #[allow(clippy::cast_precision_loss)]
    pub fn from_percent(percent: i64) -> Self {
        Self(percent.clamp(0, 100) as f64 / 100.0)
    }

    /// Build from a fraction, clamped to `[0, 1]`
    ///
    /// # Errors
    ///
    /// Returns an error for NaN, which has no meaningful probability.
    pub fn from_fraction(fraction: f64) -> Result<Self, DomainError> {
        if fraction.is_nan() {
            return Err(DomainError::InvalidFailureRate(fraction.to_string()));
        }
        Ok(Self(fraction.clamp(0.0, 1.0)))
    }

    /// The rate as a fraction in `[0, 1]`
    pub const fn as_fraction(&self) -> f64 {
        self.0
    }

    /// The rate as a percentage in `[0, 100]`
    pub fn as_percent(&self) -> f64 {
        self.0 * 100.0
    }

    /// A non-positive rate never triggers a failure
    pub fn is_disabled(&self) -> bool {
        self.0 <= 0.0
    }

    /// A rate of one always triggers a failure
    pub fn is_certain(&self) -> bool {
        self.0 >= 1.0
    }
}

impl fmt::Display for FailureRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.as_percent())
    }
}

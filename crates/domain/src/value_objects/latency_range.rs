//! Artificial latency bounds in milliseconds

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// Inclusive lower and exclusive upper latency bound
///
/// When both bounds are equal the latency is deterministic. The upper bound
/// itself is never produced by sampling.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LatencyRange {
    min_ms: u64,
    max_ms: u64,
}

impl LatencyRange {
    /// Create a latency range
    ///
    /// # Errors
    ///
    /// Returns an error if `min_ms` is greater than `max_ms`.
    pub fn new(min_ms: u64, max_ms: u64) -> Result<Self, DomainError> {
        if min_ms > max_ms {
            return Err(DomainError::InvalidLatencyRange { min_ms, max_ms });
        }
        Ok(Self { min_ms, max_ms })
    }

    /// No artificial latency
    pub const fn none() -> Self {
        Self {
            min_ms: 0,
            max_ms: 0,
        }
    }

    /// A deterministic latency
    pub const fn fixed(ms: u64) -> Self {
        Self {
            min_ms: ms,
            max_ms: ms,
        }
    }

    /// Build from signed stored columns, treating negatives as zero
    ///
    /// # Errors
    ///
    /// Returns an error if the clamped minimum exceeds the clamped maximum.
    pub fn from_stored(min_ms: i64, max_ms: i64) -> Result<Self, DomainError> {
        let clamp = |v: i64| u64::try_from(v).unwrap_or(0);
        Self::new(clamp(min_ms), clamp(max_ms))
    }

    /// Lower bound in milliseconds
    pub const fn min_ms(&self) -> u64 {
        self.min_ms
    }

    /// Upper bound in milliseconds
    pub const fn max_ms(&self) -> u64 {
        self.max_ms
    }

    /// Width of the sampling interval
    pub const fn span_ms(&self) -> u64 {
        self.max_ms - self.min_ms
    }

    /// Whether both bounds are zero, in which case no delay is applied
    pub const fn is_zero(&self) -> bool {
        self.min_ms == 0 && self.max_ms == 0
    }

    /// Whether the latency is deterministic
    pub const fn is_fixed(&self) -> bool {
        self.min_ms == self.max_ms
    }

    /// Lower bound as a duration
    pub const fn min(&self) -> Duration {
        Duration::from_millis(self.min_ms)
    }
}

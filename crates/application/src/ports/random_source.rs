//! Randomness port
//!
//! Chaos decisions draw from this port so tests can replace it with a
//! deterministic source.

#[cfg(test)]
use mockall::automock;

/// Source of uniform random numbers
#[cfg_attr(test, automock)]
pub trait RandomSource: Send + Sync {
    /// Uniform integer in `[0, upper)`; `upper` is at least 1
    fn below(&self, upper: u64) -> u64;

    /// Uniform float in `[0, 1)`
    fn unit(&self) -> f64;
}

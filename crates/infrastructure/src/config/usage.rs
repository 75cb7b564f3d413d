//! Usage counter and chaos randomness configuration.

use serde::{Deserialize, Serialize};

use super::default_true;

/// Background usage counter settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageConfig {
    /// Whether usage counters are updated at all
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Events buffered before new ones are dropped
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

const fn default_queue_capacity() -> usize {
    1024
}

impl Default for UsageConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            queue_capacity: default_queue_capacity(),
        }
    }
}

/// Chaos randomness settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChaosConfig {
    /// Fixed seed for reproducible chaos runs; unset draws from the OS
    #[serde(default)]
    pub seed: Option<u64>,
}

//! Port definitions for application layer
//!
//! Ports are interfaces that define how the application interacts with
//! external systems. Adapters in the infrastructure layer implement these ports.

mod config_store;
mod forwarder;
mod random_source;
mod usage_recorder;

pub use config_store::ConfigStore;
#[cfg(test)]
pub use config_store::MockConfigStore;
pub use forwarder::{Forwarder, ProxyRequest, ProxyResponse};
#[cfg(test)]
pub use forwarder::MockForwarder;
pub use random_source::RandomSource;
#[cfg(test)]
pub use random_source::MockRandomSource;
pub use usage_recorder::{UsageEvent, UsageRecorder};
#[cfg(test)]
pub use usage_recorder::MockUsageRecorder;

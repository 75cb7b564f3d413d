//! Application layer - Use cases and orchestration
//!
//! Resolves inbound requests to a target and a chaos policy, applies the
//! policy and forwards through the ports. Adapters in the infrastructure
//! layer implement the ports defined here.

pub mod error;
pub mod ports;
pub mod services;

pub use error::ApplicationError;
pub use ports::*;
pub use services::*;

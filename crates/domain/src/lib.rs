//! Domain layer for Latency Poison
//!
//! Contains routing entities, chaos policy value objects, URL pattern
//! matching and domain errors. This layer has no I/O and defines the
//! ubiquitous language shared by the proxy layers.

pub mod entities;
pub mod errors;
pub mod url_pattern;
pub mod value_objects;

pub use entities::*;
pub use errors::DomainError;
pub use url_pattern::UrlPattern;
pub use value_objects::*;

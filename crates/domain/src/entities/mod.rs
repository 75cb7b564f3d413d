//! Domain entities - Routing records with identity

mod access_key;
mod collection;
mod direct_route_key;
mod endpoint;

pub use access_key::{AccessKey, redact_key};
pub use collection::Collection;
pub use direct_route_key::DirectRouteKey;
pub use endpoint::Endpoint;

//! Latency Poison HTTP presentation layer
//!
//! Axum router, handlers and middleware for the chaos proxy.

pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;

pub use error::{ApiError, set_expose_internal_errors};
pub use extract::{ApiPath, ApiQuery};
pub use middleware::{REQUEST_ID_HEADER, RequestId, RequestIdLayer};
pub use routes::create_router;
pub use state::AppState;

//! Value objects - Immutable objects defined by their attributes

mod chaos_policy;
mod failure_rate;
mod ids;
mod key_scope;
mod latency_range;
mod method_filter;

pub use chaos_policy::{
    ChaosPolicy, DEFAULT_ERROR_CODES, FALLBACK_ERROR_CODE, is_valid_status,
};
pub use failure_rate::FailureRate;
pub use ids::{AccessKeyId, CollectionId, DirectRouteKeyId, EndpointId, OwnerId};
pub use key_scope::KeyScope;
pub use latency_range::LatencyRange;
pub use method_filter::{ANY_METHOD, MethodFilter};

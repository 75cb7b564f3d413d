//! Route definitions

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::Method,
    routing::{any, get},
};

use crate::{error::ApiError, handlers, state::AppState};

async fn route_not_found() -> ApiError {
    ApiError::NotFound("No route matches this path".to_string())
}

/// Only the `GET` routes can reject a method; the proxy routes take any
async fn method_not_supported(method: Method) -> ApiError {
    ApiError::MethodNotAllowed {
        method: method.to_string(),
        allowed: Method::GET.to_string(),
    }
}

/// Create the main router with all routes
///
/// Static routes take precedence over the `/{key}` catch-all, so a direct
/// key can never shadow `/health`, `/ready`, `/sandbox` or `/proxy`.
/// Catch-all segments never match an empty tail, so the trailing-slash
/// forms are registered on their own.
pub fn create_router(state: AppState) -> Router {
    let body_limit = state.max_body_bytes;

    Router::new()
        // Health and status endpoints
        .route("/health", get(handlers::health::health_check))
        .route("/ready", get(handlers::health::readiness_check))
        // Ad-hoc chaos
        .route("/sandbox", get(handlers::sandbox::sandbox))
        // Collection routing
        .route(
            "/proxy/{collection_id}",
            any(handlers::collection::proxy_collection),
        )
        .route(
            "/proxy/{collection_id}/",
            any(handlers::collection::proxy_collection),
        )
        .route(
            "/proxy/{collection_id}/{*rest}",
            any(handlers::collection::proxy_collection),
        )
        // Direct key routing
        .route("/{key}", any(handlers::direct::proxy_direct))
        .route("/{key}/", any(handlers::direct::proxy_direct))
        .route("/{key}/{*rest}", any(handlers::direct::proxy_direct))
        .fallback(route_not_found)
        .method_not_allowed_fallback(method_not_supported)
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

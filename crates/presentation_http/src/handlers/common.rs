//! Shared helpers for the proxy handlers
//!
//! Credential extraction and conversion between axum requests/responses and
//! the application's proxy types.

use application::ports::{ProxyRequest, ProxyResponse};
use axum::{
    body::Body,
    http::{HeaderMap, Method, header},
    response::{IntoResponse, Response},
};
use bytes::Bytes;

/// Header carrying an access key
pub const API_KEY_HEADER: &str = "X-API-Key";

/// Pick the access key presented by the caller
///
/// Precedence: `api_key` query parameter, then `X-API-Key`, then
/// `Authorization: Bearer <key>`. Empty values count as absent.
pub fn extract_access_key<'a>(query_key: Option<&'a str>, headers: &'a HeaderMap) -> Option<&'a str> {
    let non_empty = |value: &'a str| Some(value.trim()).filter(|v| !v.is_empty());

    query_key
        .and_then(non_empty)
        .or_else(|| {
            headers
                .get(API_KEY_HEADER)
                .and_then(|v| v.to_str().ok())
                .and_then(non_empty)
        })
        .or_else(|| {
            headers
                .get(header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.strip_prefix("Bearer "))
                .and_then(non_empty)
        })
}

/// Package the inbound request for forwarding
pub fn proxy_request(method: Method, headers: HeaderMap, body: Bytes) -> ProxyRequest {
    let mut request = ProxyRequest::new(method, body);
    request.headers = headers;
    request
}

/// Turn an upstream or injected answer into the HTTP response
pub fn relay(upstream: ProxyResponse) -> Response {
    let mut response = Response::new(Body::from(upstream.body));
    *response.status_mut() = upstream.status;
    *response.headers_mut() = upstream.headers;
    response.into_response()
}

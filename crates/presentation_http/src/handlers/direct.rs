//! Direct key routes (`/{key}`, `/{key}/` and `/{key}/{*rest}`)

use axum::{
    extract::{State, rejection::BytesRejection},
    http::{HeaderMap, Method, Uri},
    response::Response,
};
use bytes::Bytes;
use serde::Deserialize;
use tracing::instrument;

use super::common::{proxy_request, relay};
use crate::{error::ApiError, extract::ApiPath, state::AppState};

/// Path parameters of a direct key route
#[derive(Debug, Deserialize)]
pub struct DirectPath {
    pub key: String,
}

/// Path after the leading key segment, still percent-encoded
///
/// Taken from the raw URI so encoded `?`, `#` and `/` reach the upstream
/// exactly as the caller sent them.
fn raw_rest(path: &str) -> &str {
    let after_slash = path.strip_prefix('/').unwrap_or(path);
    after_slash
        .find('/')
        .map_or("", |index| &after_slash[index..])
}

/// Proxy through a direct route key
#[instrument(skip_all, fields(method = %method))]
pub async fn proxy_direct(
    State(state): State<AppState>,
    ApiPath(path): ApiPath<DirectPath>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<Response, ApiError> {
    let body = body?;

    let route = state
        .resolver
        .resolve_direct(&path.key, method.as_str(), raw_rest(uri.path()), uri.query())
        .await?;

    let response = state
        .proxy
        .dispatch(&route, proxy_request(method, headers, body))
        .await?;

    Ok(relay(response))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rest_keeps_encoding() {
        assert_eq!(raw_rest("/k123/a%3Fb%23c"), "/a%3Fb%23c");
        assert_eq!(raw_rest("/k123/x%2Fy/z"), "/x%2Fy/z");
    }

    #[test]
    fn bare_key_has_no_rest() {
        assert_eq!(raw_rest("/k123"), "");
        assert_eq!(raw_rest("/k123/"), "/");
    }
}

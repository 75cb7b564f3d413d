//! Collection routes (`/proxy/{collection_id}` with an optional trailing path)
//!
//! The upstream comes from the `url` query parameter; the trailing path is
//! accepted but not used.

use application::CollectionRequest;
use axum::{
    extract::{State, rejection::BytesRejection},
    http::{HeaderMap, Method},
    response::Response,
};
use bytes::Bytes;
use domain::CollectionId;
use serde::Deserialize;
use tracing::instrument;

use super::common::{extract_access_key, proxy_request, relay};
use crate::{
    error::ApiError,
    extract::{ApiPath, ApiQuery},
    state::AppState,
};

/// Path parameters of a collection route
#[derive(Debug, Deserialize)]
pub struct CollectionPath {
    pub collection_id: String,
}

/// Query parameters read by the proxy itself
#[derive(Debug, Default, Deserialize)]
pub struct CollectionQuery {
    /// Upstream URL, forwarded verbatim
    pub url: Option<String>,
    pub api_key: Option<String>,
}

/// Proxy through a collection's best-matching endpoint
#[instrument(skip_all, fields(collection_id = %path.collection_id, method = %method))]
pub async fn proxy_collection(
    State(state): State<AppState>,
    ApiPath(path): ApiPath<CollectionPath>,
    ApiQuery(query): ApiQuery<CollectionQuery>,
    method: Method,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<Response, ApiError> {
    let body = body?;
    let collection_id = path
        .collection_id
        .parse::<CollectionId>()
        .map_err(|_| ApiError::BadRequest("Invalid collection ID".to_string()))?;

    let route = state
        .resolver
        .resolve_collection(CollectionRequest {
            api_key: extract_access_key(query.api_key.as_deref(), &headers),
            collection_id,
            target_url: query.url.as_deref().filter(|url| !url.is_empty()),
            method: method.as_str(),
        })
        .await?;

    let response = state
        .proxy
        .dispatch(&route, proxy_request(method, headers, body))
        .await?;

    Ok(relay(response))
}

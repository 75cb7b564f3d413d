//! Sandbox route: ad-hoc chaos from query parameters, no key or store

use application::{RouteResolver, SandboxQuery};
use axum::{
    extract::State,
    http::{HeaderMap, Method},
    response::Response,
};
use bytes::Bytes;
use tracing::instrument;

use super::common::{proxy_request, relay};
use crate::{error::ApiError, extract::ApiQuery, state::AppState};

/// `GET /sandbox?url=&failrate=&failCodes=&minLatency=&maxLatency=`
#[instrument(skip_all, fields(url = query.url.as_deref().unwrap_or_default()))]
pub async fn sandbox(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<SandboxQuery>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let route = RouteResolver::sandbox(&query)?;

    let response = state
        .proxy
        .dispatch(&route, proxy_request(Method::GET, headers, Bytes::new()))
        .await?;

    Ok(relay(response))
}

//! reqwest-based upstream forwarder
//!
//! Sends the inbound method, end-to-end headers and raw body to the target
//! and hands back status, headers and body untouched. Redirects are relayed,
//! not followed, and bodies are never decompressed.

use application::{
    error::ApplicationError,
    ports::{Forwarder, ProxyRequest, ProxyResponse},
};
use async_trait::async_trait;
use http::HeaderMap;
use http::header::{self, HeaderName};
use reqwest::{Client, redirect};
use tracing::{debug, instrument, warn};
use url::Url;

use crate::config::UpstreamConfig;

/// Whether a header describes a single connection and must not be relayed
fn is_hop_by_hop(name: &HeaderName) -> bool {
    matches!(
        name.as_str(),
        "connection"
            | "keep-alive"
            | "proxy-authenticate"
            | "proxy-authorization"
            | "te"
            | "trailer"
            | "transfer-encoding"
            | "upgrade"
    )
}

/// Copy end-to-end headers only
///
/// Drops hop-by-hop headers, anything the `Connection` header names, and
/// the framing headers (`Host`, `Content-Length`) the client recomputes.
pub fn end_to_end_headers(headers: &HeaderMap) -> HeaderMap {
    let named_by_connection: Vec<String> = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .map(|name| name.trim().to_ascii_lowercase())
        .filter(|name| !name.is_empty())
        .collect();

    let mut filtered = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let skip = is_hop_by_hop(name)
            || *name == header::HOST
            || *name == header::CONTENT_LENGTH
            || named_by_connection.iter().any(|n| n == name.as_str());
        if !skip {
            filtered.append(name.clone(), value.clone());
        }
    }
    filtered
}

/// Forwarder backed by a shared reqwest client
#[derive(Debug, Clone)]
pub struct ReqwestForwarder {
    client: Client,
}

impl ReqwestForwarder {
    /// Build a forwarder from upstream settings
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying reqwest client cannot be built.
    pub fn new(config: &UpstreamConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout())
            .timeout(config.request_timeout())
            .user_agent(&config.user_agent)
            .redirect(redirect::Policy::none())
            .build()?;

        Ok(Self { client })
    }

    /// Wrap an existing client
    #[must_use]
    pub const fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Forwarder for ReqwestForwarder {
    #[instrument(skip(self, target, request), fields(host = target.host_str().unwrap_or_default(), method = %request.method))]
    async fn forward(
        &self,
        target: &Url,
        request: ProxyRequest,
    ) -> Result<ProxyResponse, ApplicationError> {
        let response = self
            .client
            .request(request.method, target.clone())
            .headers(end_to_end_headers(&request.headers))
            .body(request.body)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, timeout = e.is_timeout(), "Upstream request failed");
                ApplicationError::Upstream(describe(&e))
            })?;

        let status = response.status();
        let headers = end_to_end_headers(response.headers());
        let body = response.bytes().await.map_err(|e| {
            warn!(error = %e, "Reading upstream body failed");
            ApplicationError::Upstream(describe(&e))
        })?;

        debug!(status = status.as_u16(), bytes = body.len(), "Upstream answered");

        Ok(ProxyResponse {
            status,
            headers,
            body,
        })
    }
}

fn describe(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        "Upstream timed out".to_string()
    } else if error.is_connect() {
        format!("Failed to connect to upstream: {error}")
    } else {
        format!("Failed to proxy request: {error}")
    }
}

//! Upstream forwarding port
//!
//! Carries a request to its target and brings the response back untouched.

use async_trait::async_trait;
use bytes::Bytes;
use http::header::{CONTENT_TYPE, HeaderValue};
use http::{HeaderMap, Method, StatusCode};
#[cfg(test)]
use mockall::automock;
use url::Url;

use crate::error::ApplicationError;

/// Inbound request as forwarded to the upstream
#[derive(Debug, Clone)]
pub struct ProxyRequest {
    pub method: Method,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl ProxyRequest {
    /// Create a request without headers
    pub fn new(method: Method, body: impl Into<Bytes>) -> Self {
        Self {
            method,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }
}

/// Response relayed back to the caller
#[derive(Debug, Clone)]
pub struct ProxyResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl ProxyResponse {
    /// Synthetic failure carrying the canonical reason phrase as body
    ///
    /// Codes that cannot be rendered fall back to 500.
    pub fn injected(code: u16) -> Self {
        let status = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let reason = status.canonical_reason().unwrap_or_default();

        let mut headers = HeaderMap::new();
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("text/plain; charset=utf-8"),
        );

        Self {
            status,
            headers,
            body: Bytes::from_static(reason.as_bytes()),
        }
    }
}

/// Port for sending a request to an upstream target
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Forwarder: Send + Sync {
    /// Send `request` to `target`
    ///
    /// Transport failures map to [`ApplicationError::Upstream`]. Any HTTP
    /// status the upstream answers with, including 5xx, is a success here.
    async fn forward(
        &self,
        target: &Url,
        request: ProxyRequest,
    ) -> Result<ProxyResponse, ApplicationError>;
}

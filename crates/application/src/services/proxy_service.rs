//! Proxy dispatch
//!
//! Applies a resolved route's chaos policy and, unless a failure is
//! injected, forwards the request and relays the upstream answer.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, instrument};
use url::Url;

use crate::error::ApplicationError;
use crate::ports::{Forwarder, ProxyRequest, ProxyResponse};
use crate::services::{ChaosEngine, ResolvedRoute};

/// Dispatches resolved requests through the chaos pipeline
#[derive(Clone)]
pub struct ProxyService {
    chaos: ChaosEngine,
    forwarder: Arc<dyn Forwarder>,
}

impl fmt::Debug for ProxyService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyService")
            .field("chaos", &self.chaos)
            .finish_non_exhaustive()
    }
}

impl ProxyService {
    /// Create a proxy service
    pub fn new(chaos: ChaosEngine, forwarder: Arc<dyn Forwarder>) -> Self {
        Self { chaos, forwarder }
    }

    /// Apply the route's chaos policy, then forward
    ///
    /// Latency is waited out before the failure decision, so injected
    /// failures are delayed too. An injected failure never reaches the
    /// upstream.
    #[instrument(skip(self, route, request), fields(target = %route.target, method = %request.method))]
    pub async fn dispatch(
        &self,
        route: &ResolvedRoute,
        request: ProxyRequest,
    ) -> Result<ProxyResponse, ApplicationError> {
        let policy = &route.policy;

        if !policy.latency().is_zero() {
            let delay_ms = self.chaos.sample_latency_ms(policy.latency());
            debug!(delay_ms, "Injecting latency");
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
        }

        if self.chaos.should_fail(policy.failure_rate()) {
            let code = self.chaos.pick_error_code(policy.error_codes());
            info!(status = code, "Injecting failure");
            return Ok(ProxyResponse::injected(code));
        }

        let target = parse_target(&route.target)?;
        let response = self.forwarder.forward(&target, request).await?;
        debug!(status = response.status.as_u16(), "Relaying upstream response");
        Ok(response)
    }
}

/// Parse an absolute http(s) target URL
fn parse_target(raw: &str) -> Result<Url, ApplicationError> {
    let url = Url::parse(raw)
        .map_err(|e| ApplicationError::InvalidInput(format!("Invalid target URL: {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ApplicationError::InvalidInput(format!(
            "Unsupported target URL scheme: {other}"
        ))),
    }
}

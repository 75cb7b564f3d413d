//! Route resolution
//!
//! Maps an inbound request to an upstream target and the chaos policy to
//! apply on the way there. Three entry points exist:
//!
//! - direct keys: the key in the path names one target and one policy
//! - collections: an access key reaches a collection whose endpoints are
//!   matched against a caller-supplied URL
//! - sandbox: the policy comes straight from query parameters

use std::fmt;
use std::sync::Arc;

use domain::{
    AccessKeyId, ChaosPolicy, CollectionId, DirectRouteKeyId, Endpoint, EndpointId, FailureRate,
    LatencyRange, redact_key,
};
use serde::Deserialize;
use tracing::{Span, debug, field, info, instrument, warn};

use crate::error::ApplicationError;
use crate::ports::{ConfigStore, UsageEvent, UsageRecorder};

/// Where a resolved route came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteSource {
    Direct(DirectRouteKeyId),
    Collection {
        access_key: AccessKeyId,
        collection: CollectionId,
        endpoint: EndpointId,
    },
    Sandbox,
}

/// Upstream target plus the chaos policy to apply before reaching it
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRoute {
    /// Absolute URL the request is forwarded to
    pub target: String,
    pub policy: ChaosPolicy,
    pub source: RouteSource,
}

/// Inbound request on a collection route
#[derive(Debug, Clone, Copy)]
pub struct CollectionRequest<'a> {
    /// Access key presented by the caller, if any
    pub api_key: Option<&'a str>,
    pub collection_id: CollectionId,
    /// Upstream URL from the `url` query parameter
    pub target_url: Option<&'a str>,
    pub method: &'a str,
}

/// Raw sandbox query parameters
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SandboxQuery {
    pub url: Option<String>,
    /// Failure probability as a fraction in `[0, 1]`
    #[serde(rename = "failrate")]
    pub fail_rate: Option<String>,
    /// Comma-separated status codes
    #[serde(rename = "failCodes")]
    pub fail_codes: Option<String>,
    #[serde(rename = "minLatency")]
    pub min_latency: Option<String>,
    /// Defaults to `minLatency` when absent
    #[serde(rename = "maxLatency")]
    pub max_latency: Option<String>,
}

/// Resolves inbound requests against the routing configuration
#[derive(Clone)]
pub struct RouteResolver {
    store: Arc<dyn ConfigStore>,
    usage: Arc<dyn UsageRecorder>,
}

impl fmt::Debug for RouteResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteResolver").finish_non_exhaustive()
    }
}

impl RouteResolver {
    /// Create a resolver over a config store and a usage sink
    pub fn new(store: Arc<dyn ConfigStore>, usage: Arc<dyn UsageRecorder>) -> Self {
        Self { store, usage }
    }

    /// Resolve a direct key route (`/{key}/{rest}`)
    #[instrument(skip(self, key, query), fields(api_key = %redact_key(key)))]
    pub async fn resolve_direct(
        &self,
        key: &str,
        method: &str,
        rest_path: &str,
        query: Option<&str>,
    ) -> Result<ResolvedRoute, ApplicationError> {
        if key.is_empty() {
            return Err(ApplicationError::InvalidInput(
                "API key path segment is required".to_string(),
            ));
        }

        let Some(route) = self.store.find_direct_key(key).await? else {
            debug!("Unknown or inactive direct key");
            return Err(ApplicationError::Unauthenticated(
                "Invalid or inactive API key".to_string(),
            ));
        };

        if !route.has_target() {
            return Err(ApplicationError::InvalidInput(
                "Key has no target URL configured".to_string(),
            ));
        }

        if !route.method.allows(method) {
            return Err(ApplicationError::MethodNotAllowed {
                method: method.to_ascii_uppercase(),
                allowed: route.method.to_string(),
            });
        }

        let target = route.target_for(rest_path, query);
        debug!(route_id = %route.id, target = %target, "Resolved direct route");

        Ok(ResolvedRoute {
            target,
            policy: route.policy,
            source: RouteSource::Direct(route.id),
        })
    }

    /// Resolve a collection route (`/proxy/{collection_id}`)
    ///
    /// Once an endpoint is selected the usage counters are queued; the
    /// request does not wait for them.
    #[instrument(
        skip(self, request),
        fields(
            collection_id = %request.collection_id,
            method = %request.method,
            endpoint_id = field::Empty,
            sandbox = field::Empty,
        )
    )]
    pub async fn resolve_collection(
        &self,
        request: CollectionRequest<'_>,
    ) -> Result<ResolvedRoute, ApplicationError> {
        let Some(raw_key) = request.api_key.filter(|k| !k.is_empty()) else {
            return Err(ApplicationError::Unauthenticated(
                "API key is required".to_string(),
            ));
        };

        let Some(access_key) = self.store.find_access_key(raw_key).await? else {
            debug!(key = %redact_key(raw_key), "Unknown access key");
            return Err(ApplicationError::Unauthenticated(
                "Invalid API key".to_string(),
            ));
        };

        if !access_key.active {
            return Err(ApplicationError::Forbidden(
                "API key is inactive".to_string(),
            ));
        }

        if !access_key.can_access(request.collection_id) {
            info!(
                access_key_id = %access_key.id,
                "Access key is not scoped to collection"
            );
            return Err(ApplicationError::Forbidden(
                "API key does not have access to this collection".to_string(),
            ));
        }

        let Some(collection) = self.store.find_collection(request.collection_id).await? else {
            return Err(ApplicationError::NotFound(format!(
                "Collection {} not found",
                request.collection_id
            )));
        };

        if !collection.active {
            return Err(ApplicationError::Forbidden(
                "Collection is inactive".to_string(),
            ));
        }

        let Some(target) = request.target_url.filter(|u| !u.is_empty()) else {
            return Err(ApplicationError::InvalidInput(
                "url parameter is required".to_string(),
            ));
        };

        let endpoints = self.store.list_endpoints(collection.id).await?;
        let Some(endpoint) = Endpoint::select_best(&endpoints, request.method, target) else {
            return Err(ApplicationError::NotFound(
                "No matching endpoint found for this URL".to_string(),
            ));
        };

        let span = Span::current();
        span.record("endpoint_id", endpoint.id.as_i64());
        span.record("sandbox", endpoint.sandbox);

        self.usage.record(UsageEvent::now(
            access_key.id,
            collection.id,
            endpoint.id,
        ));

        debug!(
            pattern = %endpoint.url_pattern,
            target = %target,
            "Resolved collection route"
        );

        Ok(ResolvedRoute {
            target: target.to_string(),
            policy: endpoint.policy.clone(),
            source: RouteSource::Collection {
                access_key: access_key.id,
                collection: collection.id,
                endpoint: endpoint.id,
            },
        })
    }

    /// Resolve a sandbox request from its query parameters
    ///
    /// No key and no store are involved. An empty code list is kept empty,
    /// so injected failures answer 500.
    pub fn sandbox(query: &SandboxQuery) -> Result<ResolvedRoute, ApplicationError> {
        let Some(target) = query.url.as_deref().filter(|u| !u.is_empty()) else {
            return Err(ApplicationError::InvalidInput(
                "url parameter is required".to_string(),
            ));
        };

        let failure_rate = match non_empty(query.fail_rate.as_deref()) {
            None => FailureRate::disabled(),
            Some(raw) => {
                let fraction: f64 = raw.parse().map_err(|_| {
                    ApplicationError::InvalidInput(format!("failrate must be a number: {raw}"))
                })?;
                FailureRate::from_fraction(fraction)?
            },
        };

        let codes = parse_fail_codes(query.fail_codes.as_deref().unwrap_or_default())?;

        let min_ms = parse_latency("minLatency", query.min_latency.as_deref())?.unwrap_or(0);
        let max_ms = parse_latency("maxLatency", query.max_latency.as_deref())?.unwrap_or(min_ms);
        let latency = LatencyRange::new(min_ms, max_ms)?;

        let policy = ChaosPolicy::new(failure_rate, latency, codes)?;
        if policy.is_passthrough() {
            warn!(target = %target, "Sandbox request without chaos parameters");
        }

        Ok(ResolvedRoute {
            target: target.to_string(),
            policy,
            source: RouteSource::Sandbox,
        })
    }
}

fn non_empty(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|s| !s.is_empty())
}

/// Parse a comma-separated list of status codes, skipping blank entries
pub fn parse_fail_codes(raw: &str) -> Result<Vec<u16>, ApplicationError> {
    raw.split(',')
        .map(str::trim)
        .filter(|code| !code.is_empty())
        .map(|code| {
            code.parse::<u16>().map_err(|_| {
                ApplicationError::InvalidInput(format!("failCodes entry is not a status: {code}"))
            })
        })
        .collect()
}

fn parse_latency(name: &str, raw: Option<&str>) -> Result<Option<u64>, ApplicationError> {
    non_empty(raw)
        .map(|value| {
            value.parse::<u64>().map_err(|_| {
                ApplicationError::InvalidInput(format!(
                    "{name} must be a non-negative integer: {value}"
                ))
            })
        })
        .transpose()
}

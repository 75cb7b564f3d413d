//! Endpoint entity and best-match selection
//!
//! Endpoints belong to a collection and attach a chaos policy to every
//! target URL their pattern matches.

use serde::{Deserialize, Serialize};

use crate::url_pattern::UrlPattern;
use crate::value_objects::{ChaosPolicy, CollectionId, EndpointId, MethodFilter};

/// URL pattern plus the chaos policy applied to matching requests
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Endpoint {
    pub id: EndpointId,
    pub name: String,
    pub url_pattern: UrlPattern,
    pub method: MethodFilter,
    pub collection_id: CollectionId,
    pub policy: ChaosPolicy,
    /// Marks endpoints created for ad hoc experiments
    pub sandbox: bool,
    pub active: bool,
    pub request_count: u64,
}

impl Endpoint {
    /// Whether this endpoint can serve the given method and target URL
    pub fn accepts(&self, method: &str, url: &str) -> bool {
        self.active && self.method.allows(method) && self.url_pattern.matches(url)
    }

    /// Pick the endpoint that serves a request
    ///
    /// Among active endpoints admitting `method` whose pattern matches `url`,
    /// the highest specificity wins. Ties go to the earliest endpoint in
    /// `endpoints`, so callers pass them in insertion order.
    pub fn select_best<'a>(endpoints: &'a [Self], method: &str, url: &str) -> Option<&'a Self> {
        let mut best: Option<(&Self, usize)> = None;
        for endpoint in endpoints.iter().filter(|e| e.accepts(method, url)) {
            let score = endpoint.url_pattern.specificity();
            if best.is_none_or(|(_, top)| score > top) {
                best = Some((endpoint, score));
            }
        }
        best.map(|(endpoint, _)| endpoint)
    }
}

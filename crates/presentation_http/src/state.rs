//! Application state shared across handlers

use std::fmt;
use std::sync::Arc;

use application::ports::{ConfigStore, Forwarder, RandomSource, UsageRecorder};
use application::{ChaosEngine, ProxyService, RouteResolver};

/// Default cap on buffered inbound bodies
pub const DEFAULT_BODY_LIMIT: usize = 10 * 1024 * 1024;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Resolves inbound requests to a target and chaos policy
    pub resolver: Arc<RouteResolver>,
    /// Applies chaos and forwards upstream
    pub proxy: Arc<ProxyService>,
    /// Routing store, probed by the readiness check
    pub store: Arc<dyn ConfigStore>,
    /// Largest inbound body accepted for forwarding
    pub max_body_bytes: usize,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("max_body_bytes", &self.max_body_bytes)
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// Wire the services over the given adapters
    pub fn new(
        store: Arc<dyn ConfigStore>,
        usage: Arc<dyn UsageRecorder>,
        random: Arc<dyn RandomSource>,
        forwarder: Arc<dyn Forwarder>,
    ) -> Self {
        let resolver = RouteResolver::new(Arc::clone(&store), usage);
        let proxy = ProxyService::new(ChaosEngine::new(random), forwarder);

        Self {
            resolver: Arc::new(resolver),
            proxy: Arc::new(proxy),
            store,
            max_body_bytes: DEFAULT_BODY_LIMIT,
        }
    }

    /// Override the inbound body limit
    #[must_use]
    pub const fn with_body_limit(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }
}

//! Usage recording port

use chrono::{DateTime, Utc};
use domain::{AccessKeyId, CollectionId, EndpointId};
#[cfg(test)]
use mockall::automock;
use serde::{Deserialize, Serialize};

/// One dispatched collection request, for the usage counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageEvent {
    pub access_key_id: AccessKeyId,
    pub collection_id: CollectionId,
    pub endpoint_id: EndpointId,
    pub at: DateTime<Utc>,
}

impl UsageEvent {
    /// Usage event stamped with the current time
    pub fn now(
        access_key_id: AccessKeyId,
        collection_id: CollectionId,
        endpoint_id: EndpointId,
    ) -> Self {
        Self {
            access_key_id,
            collection_id,
            endpoint_id,
            at: Utc::now(),
        }
    }
}

/// Fire-and-forget sink for usage events
///
/// Implementations must return immediately. Losing an event is acceptable,
/// blocking the request path is not.
#[cfg_attr(test, automock)]
pub trait UsageRecorder: Send + Sync {
    /// Hand an event over for asynchronous processing
    fn record(&self, event: UsageEvent);
}

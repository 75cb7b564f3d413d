//! Routing configuration store port
//!
//! Read access to keys, collections and endpoints, plus best-effort usage
//! counter updates.

use async_trait::async_trait;
use domain::{AccessKey, Collection, CollectionId, DirectRouteKey, Endpoint};
#[cfg(test)]
use mockall::automock;

use super::UsageEvent;
use crate::error::ApplicationError;

/// Port for looking up routing configuration
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// Find an active direct route key by its raw key
    ///
    /// Inactive keys are reported as absent.
    async fn find_direct_key(&self, key: &str) -> Result<Option<DirectRouteKey>, ApplicationError>;

    /// Find an access key by its raw key, whatever its status
    async fn find_access_key(&self, key: &str) -> Result<Option<AccessKey>, ApplicationError>;

    /// Find a collection by id
    async fn find_collection(
        &self,
        id: CollectionId,
    ) -> Result<Option<Collection>, ApplicationError>;

    /// List every endpoint of a collection in ascending id order
    async fn list_endpoints(
        &self,
        collection: CollectionId,
    ) -> Result<Vec<Endpoint>, ApplicationError>;

    /// Increment the counters named by a usage event
    async fn record_usage(&self, event: &UsageEvent) -> Result<(), ApplicationError>;

    /// Check whether the store answers a trivial query
    async fn is_available(&self) -> bool;
}

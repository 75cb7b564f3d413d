//! Access key entity
//!
//! An access key identifies a caller of the collection proxy. Its scope
//! decides which collections it can reach.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::{AccessKeyId, CollectionId, KeyScope};

/// Number of leading characters kept when a key is shown in logs
const VISIBLE_KEY_PREFIX: usize = 6;

/// Caller credential for collection routing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessKey {
    pub id: AccessKeyId,
    /// Secret token presented by the caller
    pub key: String,
    pub active: bool,
    pub scope: KeyScope,
    /// Best-effort usage counter
    pub request_count: u64,
    pub created_at: DateTime<Utc>,
    pub last_used_at: Option<DateTime<Utc>>,
}

impl AccessKey {
    /// Create an active key with the given scope
    pub fn new(id: AccessKeyId, key: impl Into<String>, scope: KeyScope) -> Self {
        Self {
            id,
            key: key.into(),
            active: true,
            scope,
            request_count: 0,
            created_at: Utc::now(),
            last_used_at: None,
        }
    }

    /// Whether the key may reach the collection
    pub fn can_access(&self, collection: CollectionId) -> bool {
        self.scope.permits(collection)
    }

    /// Key with everything after a short prefix masked, for logging
    pub fn redacted(&self) -> String {
        redact_key(&self.key)
    }
}

/// Mask a raw key so it can be logged
///
/// ```
/// assert_eq!(domain::redact_key("lp_abcdefghij"), "lp_abc***");
/// assert_eq!(domain::redact_key("abc"), "***");
/// ```
pub fn redact_key(key: &str) -> String {
    if key.chars().count() <= VISIBLE_KEY_PREFIX {
        return "***".to_string();
    }
    let prefix: String = key.chars().take(VISIBLE_KEY_PREFIX).collect();
    format!("{prefix}***")
}

//! Collection entity - a named, owned group of endpoints

use serde::{Deserialize, Serialize};

use crate::value_objects::{CollectionId, OwnerId};

/// Named grouping of endpoints that can be switched on and off as a whole
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection {
    pub id: CollectionId,
    pub name: String,
    pub active: bool,
    pub request_count: u64,
    pub owner_id: OwnerId,
}

impl Collection {
    /// Create an active, unused collection
    pub fn new(id: CollectionId, name: impl Into<String>, owner_id: OwnerId) -> Self {
        Self {
            id,
            name: name.into(),
            active: true,
            request_count: 0,
            owner_id,
        }
    }
}

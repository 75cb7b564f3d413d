//! Which collections an access key may reach

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::CollectionId;

/// Access scope of an access key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "collections", rename_all = "snake_case")]
pub enum KeyScope {
    /// Every active collection is reachable
    AllCollections,
    /// Only the listed collections are reachable
    ExplicitSet(BTreeSet<CollectionId>),
}

impl KeyScope {
    /// Scope granting no collection at all
    pub fn empty() -> Self {
        Self::ExplicitSet(BTreeSet::new())
    }

    /// Build an explicit scope from collection ids
    pub fn explicit(ids: impl IntoIterator<Item = CollectionId>) -> Self {
        Self::ExplicitSet(ids.into_iter().collect())
    }

    /// Whether the scope admits the collection
    pub fn permits(&self, collection: CollectionId) -> bool {
        match self {
            Self::AllCollections => true,
            Self::ExplicitSet(ids) => ids.contains(&collection),
        }
    }
}

impl Default for KeyScope {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_collections_permits_anything() {
        assert!(KeyScope::AllCollections.permits(CollectionId::new(99)));
    }

    #[test]
    fn explicit_scope_permits_listed_only() {
        let scope = KeyScope::explicit([CollectionId::new(1), CollectionId::new(3)]);
        assert!(scope.permits(CollectionId::new(1)));
        assert!(!scope.permits(CollectionId::new(2)));
    }

    #[test]
    fn default_scope_is_empty() {
        assert!(!KeyScope::default().permits(CollectionId::new(1)));
    }
}

//! Numeric identifiers for stored routing entities
//!
//! Every entity is keyed by the integer row id assigned by the store. The
//! newtypes keep a collection id from being passed where an endpoint id is
//! expected.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wrap a raw row id
            pub const fn new(id: i64) -> Self {
                Self(id)
            }

            /// Get the raw row id
            pub const fn as_i64(&self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl FromStr for $name {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim()
                    .parse::<i64>()
                    .map(Self)
                    .map_err(|_| DomainError::invalid_id($label, s))
            }
        }
    };
}

entity_id!(
    /// Identifier of an access key
    AccessKeyId,
    "access key"
);
entity_id!(
    /// Identifier of a direct route key
    DirectRouteKeyId,
    "direct route key"
);
entity_id!(
    /// Identifier of a collection
    CollectionId,
    "collection"
);
entity_id!(
    /// Identifier of an endpoint
    EndpointId,
    "endpoint"
);
entity_id!(
    /// Identifier of the owning user account
    OwnerId,
    "owner"
);

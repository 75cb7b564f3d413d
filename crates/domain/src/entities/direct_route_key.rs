//! Direct route key entity
//!
//! A direct route key maps one key straight to one upstream target and one
//! chaos policy, without collection or endpoint indirection.

use serde::{Deserialize, Serialize};

use crate::value_objects::{ChaosPolicy, DirectRouteKeyId, MethodFilter, OwnerId};

/// Self-contained key → target + chaos mapping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectRouteKey {
    pub id: DirectRouteKeyId,
    pub name: String,
    pub key: String,
    pub active: bool,
    /// Base URL requests are forwarded to; empty when not configured
    pub target_url: String,
    pub method: MethodFilter,
    pub policy: ChaosPolicy,
    pub owner_id: OwnerId,
}

impl DirectRouteKey {
    /// Whether a target URL is configured
    pub fn has_target(&self) -> bool {
        !self.target_url.trim().is_empty()
    }

    /// Build the upstream URL for an inbound request
    ///
    /// The remaining path after the key is joined onto the base with exactly
    /// one slash, and the raw query string is appended when present.
    ///
    /// ```
    /// # use domain::*;
    /// let route = DirectRouteKey {
    ///     id: DirectRouteKeyId::new(1),
    ///     name: "up".into(),
    ///     key: "k123".into(),
    ///     active: true,
    ///     target_url: "http://up.example/base/".into(),
    ///     method: MethodFilter::Any,
    ///     policy: ChaosPolicy::passthrough(),
    ///     owner_id: OwnerId::new(1),
    /// };
    /// assert_eq!(
    ///     route.target_for("/extra", Some("x=1")),
    ///     "http://up.example/base/extra?x=1"
    /// );
    /// ```
    pub fn target_for(&self, rest_path: &str, query: Option<&str>) -> String {
        let mut target = self.target_url.trim().trim_end_matches('/').to_string();

        let rest = rest_path.trim_start_matches('/');
        if !rest.is_empty() {
            target.push('/');
            target.push_str(rest);
        }

        if let Some(query) = query.filter(|q| !q.is_empty()) {
            target.push('?');
            target.push_str(query);
        }

        target
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route(target: &str) -> DirectRouteKey {
        DirectRouteKey {
            id: DirectRouteKeyId::new(1),
            name: "test".to_string(),
            key: "k123".to_string(),
            active: true,
            target_url: target.to_string(),
            method: MethodFilter::Any,
            policy: ChaosPolicy::passthrough(),
            owner_id: OwnerId::new(1),
        }
    }

    #[test]
    fn rest_path_and_query_are_appended() {
        let r = route("http://up.example/base");
        assert_eq!(
            r.target_for("extra", Some("x=1")),
            "http://up.example/base/extra?x=1"
        );
    }

    #[test]
    fn empty_rest_keeps_base() {
        let r = route("http://up.example/base/");
        assert_eq!(r.target_for("", None), "http://up.example/base");
    }

    #[test]
    fn empty_query_is_not_appended() {
        let r = route("http://up.example");
        assert_eq!(r.target_for("/a/b", Some("")), "http://up.example/a/b");
    }

    #[test]
    fn blank_target_is_missing() {
        assert!(!route("   ").has_target());
        assert!(route("http://up.example").has_target());
    }
}

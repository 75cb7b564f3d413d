//! Glob-style URL patterns for endpoint matching
//!
//! A pattern is a URL in which every `*` stands for any (possibly empty)
//! run of characters. Matching is greedy and leftmost: each literal fragment
//! between two wildcards is consumed at its first occurrence after the
//! previous one, without backtracking.
//!
//! # Examples
//!
//! ```
//! use domain::url_pattern::{matches, specificity};
//!
//! assert!(matches("https://api.github.com/*", "https://api.github.com/users"));
//! assert!(matches("https://*.github.com/*", "https://api.github.com/x"));
//! assert!(!matches("https://other.com/*", "https://api.github.com/x"));
//!
//! assert_eq!(specificity("*"), 0);
//! assert_eq!(specificity("https://*.io/"), 12);
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// Wildcard character used in URL patterns
pub const WILDCARD: char = '*';

/// Check whether `url` is matched by `pattern`
pub fn matches(pattern: &str, url: &str) -> bool {
    if pattern == "*" || pattern == url {
        return true;
    }

    let fragments: Vec<&str> = pattern.split(WILDCARD).collect();
    if fragments.len() == 1 {
        // No wildcard and not identical
        return false;
    }

    let (Some(first), Some(last)) = (fragments.first(), fragments.last()) else {
        return false;
    };

    if !url.starts_with(first) {
        return false;
    }
    if !last.is_empty() && !url.ends_with(last) {
        return false;
    }

    // Prefix and suffix may not share characters of the url
    let start = first.len();
    let Some(end) = url.len().checked_sub(last.len()) else {
        return false;
    };
    if start > end {
        return false;
    }

    let Some(mut middle) = url.get(start..end) else {
        return false;
    };

    for fragment in &fragments[1..fragments.len() - 1] {
        if fragment.is_empty() {
            continue;
        }
        match middle.find(fragment) {
            Some(pos) => middle = &middle[pos + fragment.len()..],
            None => return false,
        }
    }

    true
}

/// Score a pattern by the number of literal (non-`*`) characters it holds
///
/// Higher scores are more specific and win when several patterns match.
pub fn specificity(pattern: &str) -> usize {
    pattern.chars().filter(|c| *c != WILDCARD).count()
}

/// A URL pattern attached to an endpoint
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UrlPattern(String);

impl UrlPattern {
    /// Wrap a raw pattern string
    pub fn new(pattern: impl Into<String>) -> Self {
        Self(pattern.into())
    }

    /// Pattern matching every URL
    pub fn any() -> Self {
        Self(WILDCARD.to_string())
    }

    /// Check whether the pattern matches a URL
    pub fn matches(&self, url: &str) -> bool {
        matches(&self.0, url)
    }

    /// Specificity score of the pattern
    pub fn specificity(&self) -> usize {
        specificity(&self.0)
    }

    /// Whether the pattern contains at least one wildcard
    pub fn has_wildcard(&self) -> bool {
        self.0.contains(WILDCARD)
    }

    /// Get the raw pattern
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UrlPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UrlPattern {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn star_matches_everything() {
        assert!(matches("*", "https://api.github.com/users"));
        assert!(matches("*", ""));
    }

    #[test]
    fn literal_pattern_requires_equality() {
        assert!(matches(
            "https://api.github.com/users",
            "https://api.github.com/users"
        ));
        assert!(!matches(
            "https://api.github.com/users",
            "https://api.github.com/users/1"
        ));
    }

    #[test]
    fn trailing_wildcard_matches_prefix() {
        assert!(matches(
            "https://api.github.com/*",
            "https://api.github.com/users"
        ));
        assert!(matches("https://api.github.com/*", "https://api.github.com/"));
        assert!(!matches("https://api.github.com/*", "https://api.github.co"));
    }

    #[test]
    fn host_wildcard_matches_subdomain() {
        assert!(matches("https://*.github.com/*", "https://api.github.com/x"));
        assert!(!matches("https://*.github.com/*", "https://github.com/x"));
    }

    #[test]
    fn foreign_host_does_not_match() {
        assert!(!matches("https://other.com/*", "https://api.github.com/x"));
    }

    #[test]
    fn leading_wildcard_matches_suffix() {
        assert!(matches("*/users", "https://api.github.com/users"));
        assert!(!matches("*/users", "https://api.github.com/users/1"));
    }

    #[test]
    fn interior_fragments_must_appear_in_order() {
        let pattern = "https://*/repos/*/issues";
        assert!(matches(pattern, "https://api.github.com/repos/rust/issues"));
        assert!(!matches(pattern, "https://api.github.com/issues/rust/repos"));
    }

    #[test]
    fn consecutive_wildcards_behave_like_one() {
        assert!(matches("https://**/x", "https://a.b/x"));
        assert!(matches("**", "anything"));
    }

    #[test]
    fn prefix_and_suffix_cannot_overlap() {
        assert!(!matches("ab*ba", "aba"));
        assert!(matches("ab*ba", "abba"));
    }

    #[test]
    fn interior_match_is_greedy_leftmost() {
        // First "/a" is consumed, the second "/a" must come after it.
        assert!(matches("x*/a*/a*y", "x/a/ay"));
        assert!(!matches("x*/a*/a*y", "x/ay"));
    }

    #[test]
    fn specificity_counts_literal_chars() {
        assert_eq!(specificity("*"), 0);
        assert_eq!(specificity("**"), 0);
        assert_eq!(specificity("abc"), 3);
        assert_eq!(specificity("https://api.github.com/*"), 23);
    }

    #[test]
    fn more_literal_pattern_is_more_specific() {
        let broad = "https://*.github.com/*";
        let narrow = "https://api.github.com/*";
        assert!(specificity(narrow) > specificity(broad));
        assert!(specificity(broad) > specificity("*"));
    }

    #[test]
    fn url_pattern_wrapper_delegates() {
        let pattern = UrlPattern::new("https://api.github.com/*");
        assert!(pattern.matches("https://api.github.com/users"));
        assert_eq!(pattern.specificity(), 23);
        assert!(pattern.has_wildcard());
        assert_eq!(pattern.to_string(), "https://api.github.com/*");
    }

    #[test]
    fn any_pattern_is_star() {
        let pattern = UrlPattern::any();
        assert_eq!(pattern.as_str(), "*");
        assert_eq!(pattern.specificity(), 0);
    }
}

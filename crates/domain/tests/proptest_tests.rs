//! Property-based tests for URL patterns and chaos value objects
//!
//! These tests use proptest to verify invariants across many random inputs.

use domain::url_pattern::{matches, specificity};
use domain::value_objects::{FailureRate, LatencyRange, MethodFilter};
use proptest::prelude::*;

// ============================================================================
// URL pattern Property Tests
// ============================================================================

mod url_pattern_tests {
    use super::*;

    proptest! {
        #[test]
        fn star_matches_any_url(url in ".*") {
            prop_assert!(matches("*", &url));
        }

        #[test]
        fn literal_pattern_matches_only_itself(
            pattern in "[a-z:/.]{0,24}",
            url in "[a-z:/.]{0,24}"
        ) {
            prop_assert_eq!(matches(&pattern, &url), pattern == url);
        }

        #[test]
        fn pattern_matches_its_own_literal(url in "[a-z:/.]{0,40}") {
            prop_assert!(matches(&url, &url));
        }

        #[test]
        fn prefix_wildcard_matches_extensions(
            prefix in "https://[a-z]{1,10}\\.com/",
            tail in "[a-z/]{0,20}"
        ) {
            let pattern = format!("{prefix}*");
            let url = format!("{prefix}{tail}");
            prop_assert!(matches(&pattern, &url));
        }

        #[test]
        fn suffix_wildcard_matches_extensions(
            head in "[a-z:/.]{0,20}",
            suffix in "/[a-z]{1,10}"
        ) {
            let pattern = format!("*{suffix}");
            let url = format!("{head}{suffix}");
            prop_assert!(matches(&pattern, &url));
        }

        #[test]
        fn specificity_counts_non_wildcard_chars(pattern in "[a-z*/]{0,40}") {
            let expected = pattern.chars().filter(|c| *c != '*').count();
            prop_assert_eq!(specificity(&pattern), expected);
        }

        #[test]
        fn adding_wildcards_never_raises_specificity(pattern in "[a-z/]{0,30}") {
            let widened = format!("*{pattern}*");
            prop_assert_eq!(specificity(&widened), specificity(&pattern));
        }
    }
}

// ============================================================================
// FailureRate Property Tests
// ============================================================================

mod failure_rate_tests {
    use super::*;

    proptest! {
        #[test]
        fn percent_is_clamped_to_unit_interval(percent in any::<i64>()) {
            let rate = FailureRate::from_percent(percent);
            prop_assert!((0.0..=1.0).contains(&rate.as_fraction()));
        }

        #[test]
        fn non_positive_percent_disables(percent in i64::MIN..=0) {
            prop_assert!(FailureRate::from_percent(percent).is_disabled());
        }

        #[test]
        fn fraction_is_clamped(fraction in -10.0f64..10.0f64) {
            let rate = FailureRate::from_fraction(fraction).unwrap();
            prop_assert!((0.0..=1.0).contains(&rate.as_fraction()));
        }
    }
}

// ============================================================================
// LatencyRange Property Tests
// ============================================================================

mod latency_range_tests {
    use super::*;

    proptest! {
        #[test]
        fn ordered_bounds_are_accepted(min in 0u64..10_000, extra in 0u64..10_000) {
            let range = LatencyRange::new(min, min + extra).unwrap();
            prop_assert_eq!(range.span_ms(), extra);
            prop_assert_eq!(range.is_fixed(), extra == 0);
        }

        #[test]
        fn inverted_bounds_are_rejected(min in 1u64..10_000, less in 1u64..10_000) {
            let max = min.saturating_sub(less);
            prop_assume!(max < min);
            prop_assert!(LatencyRange::new(min, max).is_err());
        }
    }
}

// ============================================================================
// MethodFilter Property Tests
// ============================================================================

mod method_filter_tests {
    use super::*;

    proptest! {
        #[test]
        fn any_admits_every_method(method in "[A-Za-z]{1,10}") {
            prop_assert!(MethodFilter::Any.allows(&method));
        }

        #[test]
        fn verb_filter_ignores_case(method in "[a-z]{1,10}") {
            let filter = MethodFilter::parse(&method.to_uppercase()).unwrap();
            prop_assert!(filter.allows(&method));
            prop_assert!(filter.allows(&method.to_uppercase()));
        }
    }
}

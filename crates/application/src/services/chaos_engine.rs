//! Chaos decisions
//!
//! Turns a chaos policy's data into concrete draws: how long to wait,
//! whether to fail and with which status code.

use std::fmt;
use std::sync::Arc;

use domain::{FALLBACK_ERROR_CODE, FailureRate, LatencyRange};

use crate::ports::RandomSource;

/// Draws chaos outcomes from an injected random source
#[derive(Clone)]
pub struct ChaosEngine {
    random: Arc<dyn RandomSource>,
}

impl fmt::Debug for ChaosEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChaosEngine").finish_non_exhaustive()
    }
}

impl ChaosEngine {
    /// Create an engine backed by the given random source
    pub fn new(random: Arc<dyn RandomSource>) -> Self {
        Self { random }
    }

    /// Sample a latency in milliseconds
    ///
    /// A fixed range always yields its bound. Otherwise the draw is uniform
    /// over `[min, max)`, so `max` itself is never produced.
    pub fn sample_latency_ms(&self, latency: LatencyRange) -> u64 {
        if latency.is_fixed() {
            return latency.min_ms();
        }
        let span = latency.span_ms();
        latency.min_ms() + self.random.below(span).min(span - 1)
    }

    /// Decide whether the request fails
    pub fn should_fail(&self, rate: FailureRate) -> bool {
        if rate.is_disabled() {
            return false;
        }
        if rate.is_certain() {
            return true;
        }
        self.random.unit() < rate.as_fraction()
    }

    /// Pick the status code of an injected failure
    ///
    /// Uniform over `codes`; an empty list yields 500.
    pub fn pick_error_code(&self, codes: &[u16]) -> u16 {
        let Ok(len) = u64::try_from(codes.len()) else {
            return FALLBACK_ERROR_CODE;
        };
        if len == 0 {
            return FALLBACK_ERROR_CODE;
        }
        usize::try_from(self.random.below(len))
            .ok()
            .and_then(|index| codes.get(index))
            .copied()
            .unwrap_or(FALLBACK_ERROR_CODE)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::sync::atomic::{AtomicU64, Ordering};

    use super::*;
    use crate::ports::MockRandomSource;

    /// Walks every value below `upper` in turn
    struct CyclingRandom {
        counter: AtomicU64,
    }

    impl CyclingRandom {
        fn new() -> Self {
            Self {
                counter: AtomicU64::new(0),
            }
        }
    }

    impl RandomSource for CyclingRandom {
        fn below(&self, upper: u64) -> u64 {
            self.counter.fetch_add(1, Ordering::Relaxed) % upper
        }

        #[allow(clippy::cast_precision_loss)]
        fn unit(&self) -> f64 {
            let step = self.counter.fetch_add(1, Ordering::Relaxed) % 1000;
            step as f64 / 1000.0
        }
    }

    fn engine_with(random: impl RandomSource + 'static) -> ChaosEngine {
        ChaosEngine::new(Arc::new(random))
    }

    #[test]
    fn fixed_latency_is_deterministic() {
        let mut random = MockRandomSource::new();
        random.expect_below().never();
        let engine = engine_with(random);

        assert_eq!(engine.sample_latency_ms(LatencyRange::fixed(250)), 250);
        assert_eq!(engine.sample_latency_ms(LatencyRange::none()), 0);
    }

    #[test]
    fn latency_samples_stay_in_half_open_range() {
        let engine = engine_with(CyclingRandom::new());
        let range = LatencyRange::new(100, 200).unwrap();

        let samples: BTreeSet<u64> = (0..10_000)
            .map(|_| engine.sample_latency_ms(range))
            .collect();

        assert!(samples.iter().all(|ms| (100..200).contains(ms)));
        assert!(samples.contains(&100));
        assert!(samples.contains(&199));
        assert!(!samples.contains(&200));
    }

    #[test]
    fn latency_offset_is_min_plus_draw() {
        let mut random = MockRandomSource::new();
        random
            .expect_below()
            .withf(|upper| *upper == 50)
            .return_const(7_u64);
        let engine = engine_with(random);

        let range = LatencyRange::new(10, 60).unwrap();
        assert_eq!(engine.sample_latency_ms(range), 17);
    }

    #[test]
    fn zero_rate_never_fails_nor_draws() {
        let mut random = MockRandomSource::new();
        random.expect_unit().never();
        let engine = engine_with(random);

        for _ in 0..1_000 {
            assert!(!engine.should_fail(FailureRate::from_percent(0)));
            assert!(!engine.should_fail(FailureRate::from_percent(-5)));
        }
    }

    #[test]
    fn full_rate_always_fails() {
        let engine = engine_with(CyclingRandom::new());
        for _ in 0..1_000 {
            assert!(engine.should_fail(FailureRate::from_percent(100)));
            assert!(engine.should_fail(FailureRate::from_fraction(1.0).unwrap()));
        }
    }

    #[test]
    fn partial_rate_compares_draw_against_fraction() {
        let mut random = MockRandomSource::new();
        let mut draws = vec![0.29, 0.30, 0.31].into_iter();
        random
            .expect_unit()
            .times(3)
            .returning(move || draws.next().unwrap_or(0.0));
        let engine = engine_with(random);
        let rate = FailureRate::from_percent(30);

        assert!(engine.should_fail(rate));
        assert!(!engine.should_fail(rate));
        assert!(!engine.should_fail(rate));
    }

    #[test]
    fn partial_rate_fails_proportionally() {
        let engine = engine_with(CyclingRandom::new());
        let rate = FailureRate::from_percent(25);

        let failures = (0..10_000).filter(|_| engine.should_fail(rate)).count();
        assert_eq!(failures, 2_500);
    }

    #[test]
    fn empty_code_list_yields_500() {
        let mut random = MockRandomSource::new();
        random.expect_below().never();
        let engine = engine_with(random);
        assert_eq!(engine.pick_error_code(&[]), 500);
    }

    #[test]
    fn error_code_is_drawn_from_list() {
        let engine = engine_with(CyclingRandom::new());
        let codes = [502, 503, 504];

        let picked: BTreeSet<u16> = (0..30).map(|_| engine.pick_error_code(&codes)).collect();
        assert_eq!(picked, BTreeSet::from(codes));
    }
}

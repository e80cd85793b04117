//! Jitter applied to resolved retry delays.
//!
//! Randomizing the wait before a resubscription keeps batches of failing
//! streams from re-attaching in lockstep.
//!
//! - `None`: deterministic delays, the default for this crate.
//! - `Full`: uniform in `[0, delay]`.
//! - `Equal`: uniform in `[delay/2, delay]`, keeps a floor on the wait.
//!
//! Uses `rand`'s thread-local RNG by default; tests inject a seeded RNG via
//! [`Jitter::apply_with_rng`]. Millisecond conversions saturate so very
//! large delays cannot panic.

use rand::{rng, Rng};
use std::time::Duration;

/// Strategy for randomizing a retry delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Jitter {
    /// Use the resolved delay as-is.
    #[default]
    None,
    /// Uniform between zero and the resolved delay.
    Full,
    /// Uniform between half the resolved delay and the resolved delay.
    Equal,
}

impl Jitter {
    /// Full jitter strategy.
    pub fn full() -> Self {
        Jitter::Full
    }

    /// Equal jitter strategy.
    pub fn equal() -> Self {
        Jitter::Equal
    }

    /// Randomize a delay with the thread-local RNG.
    pub fn apply(&self, delay: Duration) -> Duration {
        let mut rng = rng();
        self.apply_with_rng(delay, &mut rng)
    }

    /// Randomize a delay with a caller-supplied RNG (deterministic tests).
    pub fn apply_with_rng<R: Rng>(&self, delay: Duration, rng: &mut R) -> Duration {
        let millis = as_millis_saturated(delay);
        match self {
            Jitter::None => delay,
            Jitter::Full => {
                if millis == 0 {
                    return Duration::ZERO;
                }
                Duration::from_millis(rng.random_range(0..=millis))
            }
            Jitter::Equal => {
                if millis == 0 {
                    return Duration::ZERO;
                }
                Duration::from_millis(rng.random_range(millis / 2..=millis))
            }
        }
    }
}

fn as_millis_saturated(duration: Duration) -> u64 {
    duration.as_millis().try_into().unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn none_returns_exact_delay() {
        assert_eq!(Jitter::None.apply(Duration::from_secs(1)), Duration::from_secs(1));
    }

    #[test]
    fn full_stays_within_bounds() {
        let delay = Duration::from_secs(1);
        for _ in 0..100 {
            let jittered = Jitter::full().apply(delay);
            assert!(jittered <= delay);
        }
    }

    #[test]
    fn equal_keeps_half_delay_floor() {
        let delay = Duration::from_secs(1);
        for _ in 0..100 {
            let jittered = Jitter::equal().apply(delay);
            assert!(jittered <= delay);
            assert!(jittered >= Duration::from_millis(500));
        }
    }

    #[test]
    fn seeded_rng_is_deterministic() {
        let delay = Duration::from_millis(1000);
        let a = Jitter::full().apply_with_rng(delay, &mut StdRng::seed_from_u64(42));
        let b = Jitter::full().apply_with_rng(delay, &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
        assert!(a <= delay);
    }

    #[test]
    fn zero_delay_stays_zero() {
        assert_eq!(Jitter::full().apply(Duration::ZERO), Duration::ZERO);
        assert_eq!(Jitter::equal().apply(Duration::ZERO), Duration::ZERO);
    }
}

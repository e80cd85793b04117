//! Backoff strategies resolving retry delays.
//!
//! A `Backoff` maps the current retry count to the delay that should elapse
//! before the next resubscription. Count `0` means "no failures yet" and
//! always resolves to zero delay; retries start at count `1`. Delays
//! saturate at [`MAX_BACKOFF`] so arithmetic can never overflow.
//!
//! Example
//! ```rust
//! use std::time::Duration;
//! use resub::Backoff;
//!
//! let backoff = Backoff::exponential(Duration::from_millis(100))
//!     .with_max(Duration::from_secs(2))
//!     .unwrap();
//! assert_eq!(backoff.delay(1), Duration::from_millis(100));
//! assert_eq!(backoff.delay(2), Duration::from_millis(200));
//! assert_eq!(backoff.delay(6), Duration::from_secs(2)); // capped
//! ```

use std::fmt;
use std::time::Duration;

/// Ceiling applied when a computed delay would overflow (1 day).
pub const MAX_BACKOFF: Duration = Duration::from_secs(24 * 60 * 60);

/// Errors returned by backoff configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackoffError {
    /// `with_max` only applies to growing strategies.
    ConstantDoesNotSupportMax,
    /// A zero cap would suppress every delay.
    MaxMustBePositive,
    /// The cap must be at least the base delay.
    MaxLessThanBase { base: Duration, max: Duration },
}

impl fmt::Display for BackoffError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackoffError::ConstantDoesNotSupportMax => {
                write!(f, "with_max is only valid for linear or exponential backoff")
            }
            BackoffError::MaxMustBePositive => write!(f, "max must be greater than zero"),
            BackoffError::MaxLessThanBase { base, max } => {
                write!(f, "max ({:?}) must be >= base ({:?})", max, base)
            }
        }
    }
}

impl std::error::Error for BackoffError {}

/// Delay strategy as a function of the current retry count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Backoff {
    /// Same delay for every retry.
    Constant { delay: Duration },
    /// `base * count`, optionally capped.
    Linear { base: Duration, max: Option<Duration> },
    /// `base * 2^(count - 1)`, optionally capped.
    Exponential { base: Duration, max: Option<Duration> },
}

impl Backoff {
    /// Fixed delay between retries.
    pub fn constant(delay: Duration) -> Self {
        Backoff::Constant { delay }
    }

    /// Delay growing linearly with the retry count.
    pub fn linear(base: Duration) -> Self {
        Backoff::Linear { base, max: None }
    }

    /// Delay doubling with each retry.
    pub fn exponential(base: Duration) -> Self {
        Backoff::Exponential { base, max: None }
    }

    /// Cap the delay of a growing strategy. Rejects a zero cap, a cap below
    /// the base delay, and constant strategies (which have nothing to cap).
    pub fn with_max(mut self, cap: Duration) -> Result<Self, BackoffError> {
        if cap.is_zero() {
            return Err(BackoffError::MaxMustBePositive);
        }
        match &mut self {
            Backoff::Linear { base, max } | Backoff::Exponential { base, max } => {
                if cap < *base {
                    return Err(BackoffError::MaxLessThanBase { base: *base, max: cap });
                }
                *max = Some(cap);
                Ok(self)
            }
            Backoff::Constant { .. } => Err(BackoffError::ConstantDoesNotSupportMax),
        }
    }

    /// Resolve the delay for the given retry count (0 = no failures, no delay).
    pub fn delay(&self, count: u32) -> Duration {
        if count == 0 {
            return Duration::ZERO;
        }
        let raw = match self {
            Backoff::Constant { delay } => *delay,
            Backoff::Linear { base, .. } => base.checked_mul(count).unwrap_or(MAX_BACKOFF),
            Backoff::Exponential { base, .. } => {
                let multiplier = 2u128.saturating_pow(count - 1);
                let nanos = base.as_nanos().saturating_mul(multiplier);
                Duration::from_nanos(nanos.min(MAX_BACKOFF.as_nanos()) as u64)
            }
        };
        let capped = match self {
            Backoff::Linear { max: Some(cap), .. }
            | Backoff::Exponential { max: Some(cap), .. } => raw.min(*cap),
            _ => raw,
        };
        capped.min(MAX_BACKOFF)
    }
}

impl From<Duration> for Backoff {
    /// A bare duration reads as a constant delay.
    fn from(delay: Duration) -> Self {
        Backoff::constant(delay)
    }
}

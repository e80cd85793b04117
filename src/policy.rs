//! Retry policy: the decision oracle consulted after every source error.
//!
//! A [`RetryPolicy`] owns the mutable retry counter and answers two
//! questions for the operator: is another attempt warranted, and how long
//! should the stream wait before resubscribing. The counter is reset on
//! every successful emission, so failure bursts separated by good values
//! never exhaust a finite limit.
//!
//! Policies are single-owner: the operator takes its policy by value, so
//! two streams can never share a counter. Call sites that want to reuse a
//! configured policy clone it, which gives each stream an independent
//! counter.
//!
//! Example
//! ```rust
//! use std::time::Duration;
//! use resub::{Backoff, RetryPolicy};
//!
//! let policy = RetryPolicy::builder("load price feed")
//!     .error_message("price feed unavailable")
//!     .limit(5)
//!     .backoff(Backoff::exponential(Duration::from_millis(100)))
//!     .build();
//! assert!(policy.should_retry());
//! ```

use crate::{Backoff, Jitter};
use std::fmt;
use std::time::Duration;

/// Upper bound on delayed retries for one failure burst.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryLimit {
    /// Never stop retrying.
    Unlimited,
    /// At most this many delayed retries; the next failure is terminal.
    Limited(u32),
}

impl RetryLimit {
    /// Whether a policy at the given retry count may schedule another attempt.
    pub fn allows(&self, count: u32) -> bool {
        match self {
            RetryLimit::Unlimited => true,
            RetryLimit::Limited(n) => count <= *n,
        }
    }
}

impl fmt::Display for RetryLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RetryLimit::Unlimited => write!(f, "unlimited"),
            RetryLimit::Limited(n) => write!(f, "{}", n),
        }
    }
}

/// Decides, after an error, whether another attempt is warranted and how
/// long to wait for it.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    description: String,
    error_message: String,
    limit: RetryLimit,
    backoff: Backoff,
    jitter: Jitter,
    retry_count: u32,
}

impl RetryPolicy {
    /// Start building a policy for the named operation.
    pub fn builder(description: impl Into<String>) -> RetryPolicyBuilder {
        RetryPolicyBuilder::new(description)
    }

    /// A policy that retries forever with a fixed delay.
    pub fn unlimited(description: impl Into<String>, delay: Duration) -> Self {
        Self::builder(description).limit_unlimited().backoff(delay).build()
    }

    /// A policy allowing `retries` delayed attempts with a fixed delay.
    pub fn limited(description: impl Into<String>, retries: u32, delay: Duration) -> Self {
        Self::builder(description).limit(retries).backoff(delay).build()
    }

    /// Record a failure.
    pub fn increment_retry_count(&mut self) {
        self.retry_count = self.retry_count.saturating_add(1);
    }

    /// Whether the policy authorizes another attempt at the current count.
    pub fn should_retry(&self) -> bool {
        self.limit.allows(self.retry_count)
    }

    /// Concrete delay before the next attempt, resolved from the backoff at
    /// the current retry count with jitter applied.
    pub fn retry_after(&self) -> Duration {
        self.jitter.apply(self.backoff.delay(self.retry_count))
    }

    /// Clear the failure history. Called on every successful emission;
    /// a no-op when the count is already zero.
    pub fn reset(&mut self) {
        self.retry_count = 0;
    }

    /// Failures recorded since the last reset.
    pub fn retry_count(&self) -> u32 {
        self.retry_count
    }

    /// Operation name used in logs.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Context carried into the terminal error.
    pub fn error_message(&self) -> &str {
        &self.error_message
    }

    /// The configured limit.
    pub fn limit(&self) -> RetryLimit {
        self.limit
    }
}

/// Builder for [`RetryPolicy`]. No invalid combination is representable,
/// so `build` is infallible.
#[derive(Debug, Clone)]
pub struct RetryPolicyBuilder {
    description: String,
    error_message: Option<String>,
    limit: RetryLimit,
    backoff: Backoff,
    jitter: Jitter,
}

impl RetryPolicyBuilder {
    fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            error_message: None,
            limit: RetryLimit::Limited(3),
            backoff: Backoff::constant(Duration::from_secs(1)),
            jitter: Jitter::None,
        }
    }

    /// Context for the terminal error; defaults to the description.
    pub fn error_message(mut self, message: impl Into<String>) -> Self {
        self.error_message = Some(message.into());
        self
    }

    /// Allow at most `retries` delayed attempts.
    pub fn limit(mut self, retries: u32) -> Self {
        self.limit = RetryLimit::Limited(retries);
        self
    }

    /// Never stop retrying.
    pub fn limit_unlimited(mut self) -> Self {
        self.limit = RetryLimit::Unlimited;
        self
    }

    /// Delay strategy; a bare `Duration` reads as a constant delay.
    pub fn backoff(mut self, backoff: impl Into<Backoff>) -> Self {
        self.backoff = backoff.into();
        self
    }

    /// Randomize resolved delays.
    pub fn jitter(mut self, jitter: Jitter) -> Self {
        self.jitter = jitter;
        self
    }

    pub fn build(self) -> RetryPolicy {
        let error_message = self.error_message.unwrap_or_else(|| self.description.clone());
        RetryPolicy {
            description: self.description,
            error_message,
            limit: self.limit,
            backoff: self.backoff,
            jitter: self.jitter,
            retry_count: 0,
        }
    }
}

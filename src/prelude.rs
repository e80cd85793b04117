//! Convenient re-exports for common resub types.
pub use crate::{
    backoff::{Backoff, BackoffError, MAX_BACKOFF},
    error::RetryExhausted,
    jitter::Jitter,
    policy::{RetryLimit, RetryPolicy, RetryPolicyBuilder},
    retry::{retry_with_policy, RetryStream},
    scheduler::{InlineScheduler, RecordingScheduler, Scheduler, TokioScheduler},
};

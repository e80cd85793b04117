#![forbid(unsafe_code)]
#![deny(warnings)]
#![cfg_attr(not(test), deny(clippy::all))]

//! # resub
//!
//! A retry-with-policy operator for async streams: transparently
//! resubscribe to a failing source, governed by a [`RetryPolicy`], with
//! delayed reattachment through a pluggable [`Scheduler`].
//!
//! ## Features
//!
//! - **Retry policies** with a mutable attempt counter that resets on every
//!   successful emission, so failure bursts separated by good values never
//!   exhaust a finite limit
//! - **Backoff strategies** (constant, linear, exponential) with optional
//!   caps, plus **jitter**
//! - **Structured terminal errors** carrying the attempt count and original
//!   cause instead of interpolated strings
//! - **Deterministic testing** via injectable schedulers and tokio's
//!   virtual time
//!
//! ## Quick Start
//!
//! ```rust
//! use resub::{retry_with_policy, RetryPolicy};
//! use futures::{stream, StreamExt};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() {
//!     let policy = RetryPolicy::unlimited("poll quotes", Duration::from_secs(1));
//!     let mut quotes = Box::pin(retry_with_policy(
//!         || stream::iter(vec![Ok::<_, std::io::Error>(42)]),
//!         policy,
//!     ));
//!     while let Some(Ok(quote)) = quotes.next().await {
//!         println!("{quote}");
//!     }
//! }
//! ```

pub mod backoff;
pub mod error;
pub mod jitter;
pub mod policy;
pub mod prelude;
pub mod retry;
pub mod scheduler;

// Re-exports
pub use backoff::{Backoff, BackoffError, MAX_BACKOFF};
pub use error::RetryExhausted;
pub use jitter::Jitter;
pub use policy::{RetryLimit, RetryPolicy, RetryPolicyBuilder};
pub use retry::{retry_with_policy, RetryStream};
pub use scheduler::{InlineScheduler, RecordingScheduler, Scheduler, TokioScheduler};

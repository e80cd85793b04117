//! Scheduler abstraction for delayed resubscription.
//!
//! The retry operator never sleeps inline; it asks a [`Scheduler`] for a
//! future that resolves once the configured delay has elapsed. The returned
//! future doubles as the cancellation handle: dropping it (which happens
//! whenever the output stream is dropped) cancels the pending
//! resubscription. A scheduler that is torn down and never completes its
//! future therefore behaves exactly like downstream cancellation: the
//! stream stalls, no synthetic error is produced.
//!
//! The in-crate implementations cover production ([`TokioScheduler`]) and
//! deterministic tests ([`InlineScheduler`], [`RecordingScheduler`]).

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// A pending, cancellable delay.
pub type Delay = Pin<Box<dyn Future<Output = ()> + Send>>;

/// Schedules an action to run after a delay by handing back a future that
/// resolves once the delay has elapsed.
pub trait Scheduler: Send + Sync + std::fmt::Debug {
    fn delay(&self, after: Duration) -> Delay;
}

/// Production scheduler backed by the tokio timer wheel.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioScheduler;

impl Scheduler for TokioScheduler {
    fn delay(&self, after: Duration) -> Delay {
        Box::pin(tokio::time::sleep(after))
    }
}

/// Test scheduler whose delays resolve immediately.
#[derive(Debug, Default, Clone, Copy)]
pub struct InlineScheduler;

impl Scheduler for InlineScheduler {
    fn delay(&self, _after: Duration) -> Delay {
        Box::pin(async {})
    }
}

/// Test scheduler that resolves immediately and records every requested
/// delay for later assertion.
#[derive(Debug, Clone, Default)]
pub struct RecordingScheduler {
    requested: Arc<Mutex<Vec<Duration>>>,
}

impl RecordingScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delays requested so far, in order.
    pub fn requested(&self) -> Vec<Duration> {
        self.requested.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.requested.lock().unwrap().clear();
    }
}

impl Scheduler for RecordingScheduler {
    fn delay(&self, after: Duration) -> Delay {
        self.requested.lock().unwrap().push(after);
        Box::pin(async {})
    }
}

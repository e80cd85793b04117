//! The retry-with-policy stream operator.
//!
//! [`retry_with_policy`] wraps a *stream factory* (the pull-based analog
//! of resubscribing to a source) and yields every value the current
//! subscription produces. When the subscription fails, the policy decides
//! whether to resubscribe after a delay or to surface a single structured
//! terminal error. Retries that the policy absorbs are invisible
//! downstream: the consumer sees either an unbroken sequence of values or
//! exactly one [`RetryExhausted`].
//!
//! An `Err` item is terminal for its subscription: the inner stream is
//! dropped at that point and never polled past the error.
//!
//! Cancellation is dropping the output stream. Dropping it releases the
//! active subscription and any pending delay in one move, so a scheduled
//! retry can never fire afterwards.
//!
//! Example
//! ```rust
//! use std::time::Duration;
//! use futures::{stream, StreamExt};
//! use resub::{retry_with_policy, RetryPolicy};
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let outputs = retry_with_policy(
//!     || stream::iter(vec![Ok::<_, std::io::Error>(1), Ok(2)]),
//!     RetryPolicy::limited("demo", 3, Duration::from_millis(10)),
//! )
//! .collect::<Vec<_>>()
//! .await;
//! assert_eq!(outputs.len(), 2);
//! # });
//! ```

use crate::error::RetryExhausted;
use crate::scheduler::{Delay, Scheduler, TokioScheduler};
use crate::RetryPolicy;
use futures::ready;
use futures::stream::{FusedStream, Stream};
use pin_project::pin_project;
use std::fmt;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

/// Wrap a stream factory with policy-driven resubscription.
///
/// `factory` is invoked once per subscription attempt: lazily on the first
/// poll, then again after each policy-authorized delay. The policy is taken
/// by value; its counters are owned by this operator alone.
pub fn retry_with_policy<S, F, T, E>(factory: F, policy: RetryPolicy) -> RetryStream<S, F, E>
where
    S: Stream<Item = Result<T, E>>,
    F: FnMut() -> S,
{
    RetryStream {
        factory,
        policy,
        scheduler: Arc::new(TokioScheduler),
        on_error: None,
        state: State::Idle,
    }
}

type ErrorHook<E> = Box<dyn FnMut(&E) + Send>;

/// Stream produced by [`retry_with_policy`].
#[pin_project]
pub struct RetryStream<S, F, E> {
    factory: F,
    policy: RetryPolicy,
    scheduler: Arc<dyn Scheduler>,
    on_error: Option<ErrorHook<E>>,
    #[pin]
    state: State<S>,
}

/// Lifecycle of the operator. Exactly one subscription can be live at a
/// time because only the `Active` variant holds one; entering
/// `AwaitingRetry` drops it, and `Terminated` is absorbing.
#[pin_project(project = StateProj)]
enum State<S> {
    /// Not yet subscribed; the first poll invokes the factory.
    Idle,
    /// One inner subscription live, polled through.
    Active {
        #[pin]
        inner: S,
    },
    /// Previous subscription released, waiting out the scheduled delay.
    AwaitingRetry { wait: Delay },
    /// Completed, errored out, or exhausted.
    Terminated,
}

impl<S, F, E> RetryStream<S, F, E> {
    /// Side-effect hook invoked with each raw source error before the
    /// policy is consulted.
    pub fn on_error<H>(mut self, hook: H) -> Self
    where
        H: FnMut(&E) + Send + 'static,
    {
        self.on_error = Some(Box::new(hook));
        self
    }

    /// Replace the scheduler used for delayed resubscription. Defaults to
    /// [`TokioScheduler`].
    pub fn with_scheduler(mut self, scheduler: Arc<dyn Scheduler>) -> Self {
        self.scheduler = scheduler;
        self
    }

    /// Observe the policy driving this stream.
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }
}

impl<S, F, E> fmt::Debug for RetryStream<S, F, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match self.state {
            State::Idle => "idle",
            State::Active { .. } => "active",
            State::AwaitingRetry { .. } => "awaiting-retry",
            State::Terminated => "terminated",
        };
        f.debug_struct("RetryStream")
            .field("policy", &self.policy)
            .field("state", &state)
            .finish_non_exhaustive()
    }
}

impl<S, F, T, E> Stream for RetryStream<S, F, E>
where
    S: Stream<Item = Result<T, E>>,
    F: FnMut() -> S,
    E: fmt::Display,
{
    type Item = Result<T, RetryExhausted<E>>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        loop {
            let mut this = self.as_mut().project();
            match this.state.as_mut().project() {
                StateProj::Idle => {
                    let inner = (this.factory)();
                    this.state.set(State::Active { inner });
                }
                StateProj::Active { inner } => match ready!(inner.poll_next(cx)) {
                    Some(Ok(value)) => {
                        this.policy.reset();
                        return Poll::Ready(Some(Ok(value)));
                    }
                    Some(Err(err)) => {
                        if let Some(hook) = this.on_error.as_mut() {
                            hook(&err);
                        }
                        this.policy.increment_retry_count();
                        if this.policy.should_retry() {
                            let after = this.policy.retry_after();
                            tracing::error!(
                                operation = %this.policy.description(),
                                error = %err,
                                attempt = this.policy.retry_count(),
                                limit = %this.policy.limit(),
                                delay_ms = after.as_millis() as u64,
                                "source failed, scheduling retry"
                            );
                            let wait = this.scheduler.delay(after);
                            // Setting the state drops the failed subscription
                            // before the delay starts running.
                            this.state.set(State::AwaitingRetry { wait });
                        } else {
                            tracing::error!(
                                operation = %this.policy.description(),
                                error = %err,
                                attempts = this.policy.retry_count(),
                                "retry limit reached, surfacing terminal error"
                            );
                            let failure = RetryExhausted::new(
                                this.policy.retry_count(),
                                this.policy.error_message().to_owned(),
                                err,
                            );
                            this.state.set(State::Terminated);
                            return Poll::Ready(Some(Err(failure)));
                        }
                    }
                    None => {
                        this.state.set(State::Terminated);
                        return Poll::Ready(None);
                    }
                },
                StateProj::AwaitingRetry { wait } => {
                    ready!(wait.as_mut().poll(cx));
                    tracing::debug!(operation = %this.policy.description(), "retrying");
                    let inner = (this.factory)();
                    this.state.set(State::Active { inner });
                }
                StateProj::Terminated => return Poll::Ready(None),
            }
        }
    }
}

impl<S, F, T, E> FusedStream for RetryStream<S, F, E>
where
    S: Stream<Item = Result<T, E>>,
    F: FnMut() -> S,
    E: fmt::Display,
{
    fn is_terminated(&self) -> bool {
        matches!(self.state, State::Terminated)
    }
}

//! End-to-end behavior of the retry operator under tokio virtual time.

use futures::stream::FusedStream;
use futures::{stream, StreamExt};
use resub::{retry_with_policy, RetryPolicy};
use std::pin::pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("source failed")]
struct SourceError;

type SourceStream = stream::Iter<std::vec::IntoIter<Result<u32, SourceError>>>;

fn counting_factory(
    calls: Arc<AtomicUsize>,
    items: impl Fn(usize) -> Vec<Result<u32, SourceError>> + Send + 'static,
) -> impl FnMut() -> SourceStream {
    move || {
        let attempt = calls.fetch_add(1, Ordering::SeqCst);
        stream::iter(items(attempt))
    }
}

#[tokio::test(start_paused = true)]
async fn unlimited_retries_never_terminate() {
    let calls = Arc::new(AtomicUsize::new(0));
    let factory = counting_factory(calls.clone(), |_| vec![Err(SourceError)]);
    let mut output = pin!(retry_with_policy(
        factory,
        RetryPolicy::unlimited("always failing", Duration::from_secs(1)),
    ));

    for expected_subscriptions in 1..=25 {
        // Each poll drives one failed subscription into the waiting state.
        assert!(futures::poll!(output.next()).is_pending());
        assert_eq!(calls.load(Ordering::SeqCst), expected_subscriptions);
        tokio::time::advance(Duration::from_secs(1)).await;
    }

    assert!(!output.is_terminated());
}

#[tokio::test(start_paused = true)]
async fn limited_policy_terminates_with_attempt_count() {
    let calls = Arc::new(AtomicUsize::new(0));
    let factory = counting_factory(calls.clone(), |_| vec![Err(SourceError)]);
    let started = tokio::time::Instant::now();

    let outputs = retry_with_policy(
        factory,
        RetryPolicy::builder("doomed fetch")
            .error_message("backend unreachable")
            .limit(2)
            .backoff(Duration::from_millis(100))
            .build(),
    )
    .collect::<Vec<_>>()
    .await;

    // Two scheduled retries at ~100ms apart, then the terminal error.
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert_eq!(started.elapsed(), Duration::from_millis(200));

    assert_eq!(outputs.len(), 1, "earlier failures must not surface");
    let failure = outputs[0].as_ref().unwrap_err();
    assert_eq!(failure.attempts(), 3);
    assert_eq!(failure.message(), "backend unreachable");
    assert_eq!(failure.cause(), &SourceError);
}

#[tokio::test(start_paused = true)]
async fn cyclic_source_recovers_in_chunks() {
    // The playground scenario: values 0..=9 where everything from 5 up
    // fails; each subscription therefore delivers 0..=4 and dies.
    let calls = Arc::new(AtomicUsize::new(0));
    let factory = counting_factory(calls.clone(), |_| {
        (0..10).map(|i| if i < 5 { Ok(i) } else { Err(SourceError) }).collect()
    });
    let started = tokio::time::Instant::now();

    let mut output = pin!(retry_with_policy(
        factory,
        RetryPolicy::unlimited("cyclic feed", Duration::from_secs(1)),
    ));

    let mut values = Vec::new();
    for _ in 0..15 {
        values.push(output.next().await.unwrap().unwrap());
    }

    assert_eq!(values, vec![0, 1, 2, 3, 4, 0, 1, 2, 3, 4, 0, 1, 2, 3, 4]);
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert_eq!(started.elapsed(), Duration::from_secs(2), "one delay per resubscription");
    assert!(!output.is_terminated());
}

#[tokio::test(start_paused = true)]
async fn policy_accessor_tracks_the_failure_count() {
    let calls = Arc::new(AtomicUsize::new(0));
    let factory = counting_factory(calls.clone(), |_| vec![Err(SourceError)]);
    let mut output = pin!(retry_with_policy(
        factory,
        RetryPolicy::unlimited("observed feed", Duration::from_secs(1)),
    ));

    assert_eq!(output.policy().description(), "observed feed");
    assert_eq!(output.policy().retry_count(), 0);

    assert!(futures::poll!(output.next()).is_pending());
    assert_eq!(output.policy().retry_count(), 1);

    tokio::time::advance(Duration::from_secs(1)).await;
    assert!(futures::poll!(output.next()).is_pending());
    assert_eq!(output.policy().retry_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn dropping_during_the_wait_cancels_the_retry() {
    let calls = Arc::new(AtomicUsize::new(0));
    let factory = counting_factory(calls.clone(), |_| vec![Err(SourceError)]);

    {
        let mut output = pin!(retry_with_policy(
            factory,
            RetryPolicy::unlimited("cancelled", Duration::from_secs(1)),
        ));
        assert!(futures::poll!(output.next()).is_pending());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        // Dropped here, mid-AwaitingRetry.
    }

    tokio::time::advance(Duration::from_secs(10)).await;
    tokio::task::yield_now().await;
    assert_eq!(calls.load(Ordering::SeqCst), 1, "no resubscription after cancellation");
}

#[tokio::test(start_paused = true)]
async fn success_between_failures_resets_the_limit() {
    // One failure per subscription with limit(1): only reset-on-success
    // keeps this stream alive past the second failure.
    let calls = Arc::new(AtomicUsize::new(0));
    let factory =
        counting_factory(calls.clone(), |attempt| vec![Ok(attempt as u32), Err(SourceError)]);

    let outputs = retry_with_policy(
        factory,
        RetryPolicy::limited("bursty feed", 1, Duration::from_millis(50)),
    )
    .take(6)
    .collect::<Vec<_>>()
    .await;

    assert_eq!(outputs, vec![Ok(0), Ok(1), Ok(2), Ok(3), Ok(4), Ok(5)]);
}

#[tokio::test(start_paused = true)]
async fn completion_ends_the_stream_without_resubscription() {
    let calls = Arc::new(AtomicUsize::new(0));
    let factory = counting_factory(calls.clone(), |_| vec![Ok(7), Ok(8)]);

    let mut output = pin!(retry_with_policy(
        factory,
        RetryPolicy::unlimited("finite feed", Duration::from_secs(1)),
    ));

    assert_eq!(output.next().await, Some(Ok(7)));
    assert_eq!(output.next().await, Some(Ok(8)));
    assert_eq!(output.next().await, None);
    assert!(output.is_terminated());

    tokio::time::advance(Duration::from_secs(5)).await;
    assert_eq!(output.next().await, None);
    assert_eq!(calls.load(Ordering::SeqCst), 1, "completion never resubscribes");
}

//! The cyclic-failure playground: a ticking source that fails on every
//! value from 5 upward, retried forever with a one second delay. Prints
//! `0 1 2 3 4`, pauses, and repeats until interrupted.
use futures::{stream, Stream, StreamExt};
use resub::prelude::*;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
#[error("tick {0} is out of range")]
struct TickError(u64);

fn ticks() -> impl Stream<Item = Result<u64, TickError>> {
    stream::unfold(0u64, |i| async move {
        tokio::time::sleep(Duration::from_millis(250)).await;
        let item = if i % 10 < 5 { Ok(i) } else { Err(TickError(i)) };
        Some((item, i + 1))
    })
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let policy = RetryPolicy::unlimited("cyclic tick feed", Duration::from_secs(1));
    let mut feed = Box::pin(retry_with_policy(ticks, policy));

    while let Some(tick) = feed.next().await {
        match tick {
            Ok(value) => println!("tick: {value}"),
            Err(failure) => {
                eprintln!("feed died: {failure}");
                break;
            }
        }
    }
}

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};
use std::time::Duration;

use super::*;

const DELAY: Duration = Duration::from_millis(550);

/// Let the woken debounce task and the action task it spawns both run.
async fn settle() {
    for _ in 0..4 {
        tokio::task::yield_now().await;
    }
}

#[tokio::test(start_paused = true)]
async fn burst_of_calls_fires_exactly_once() {
    let debouncer = Debouncer::new(DELAY);
    let fired = Arc::new(AtomicUsize::new(0));

    for _ in 0..10 {
        let fired = Arc::clone(&fired);
        debouncer
            .call(async move {
                fired.fetch_add(1, Ordering::SeqCst);
            })
            .await;
        tokio::time::advance(Duration::from_millis(10)).await;
    }

    tokio::time::advance(DELAY).await;
    settle().await;
    assert_eq!(fired.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn deadline_is_anchored_at_the_trigger() {
    let debouncer = Debouncer::new(DELAY);
    let fired = Arc::new(AtomicUsize::new(0));

    {
        let fired = Arc::clone(&fired);
        debouncer
            .call(async move {
                fired.fetch_add(1, Ordering::SeqCst);
            })
            .await;
    }
    // The full delay elapses before the armed task has ever been polled;
    // it must still count from the trigger and fire on the next wake.
    tokio::time::advance(DELAY).await;
    settle().await;
    assert_eq!(fired.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn delay_restarts_from_the_last_call() {
    let debouncer = Debouncer::new(DELAY);
    let fired = Arc::new(AtomicUsize::new(0));

    {
        let fired = Arc::clone(&fired);
        debouncer
            .call(async move {
                fired.fetch_add(1, Ordering::SeqCst);
            })
            .await;
    }
    tokio::time::advance(Duration::from_millis(500)).await;

    // Re-arm 50ms before the first invocation would have fired.
    {
        let fired = Arc::clone(&fired);
        debouncer
            .call(async move {
                fired.fetch_add(1, Ordering::SeqCst);
            })
            .await;
    }
    tokio::time::advance(Duration::from_millis(500)).await;
    settle().await;
    assert_eq!(fired.load(Ordering::SeqCst), 0);

    tokio::time::advance(Duration::from_millis(60)).await;
    settle().await;
    assert_eq!(fired.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn cancel_drops_the_pending_invocation() {
    let debouncer = Debouncer::new(DELAY);
    let fired = Arc::new(AtomicUsize::new(0));

    {
        let fired = Arc::clone(&fired);
        debouncer
            .call(async move {
                fired.fetch_add(1, Ordering::SeqCst);
            })
            .await;
    }
    debouncer.cancel().await;

    tokio::time::advance(DELAY * 2).await;
    settle().await;
    assert_eq!(fired.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn panic_in_one_invocation_does_not_disable_the_wrapper() {
    let debouncer = Debouncer::new(DELAY);

    debouncer
        .call(async move {
            panic!("boom");
        })
        .await;
    tokio::time::advance(DELAY).await;
    settle().await;

    let fired = Arc::new(AtomicUsize::new(0));
    {
        let fired = Arc::clone(&fired);
        debouncer
            .call(async move {
                fired.fetch_add(1, Ordering::SeqCst);
            })
            .await;
    }
    tokio::time::advance(DELAY).await;
    settle().await;
    assert_eq!(fired.load(Ordering::SeqCst), 1);
}

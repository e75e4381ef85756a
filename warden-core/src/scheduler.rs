use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;

/// Runs reversal actions once their delay has elapsed.
///
/// Registration is O(1): each reversal is a spawned task sleeping until its
/// deadline. Handles are not persisted, so pending reversals are lost when
/// the process exits; reversals must therefore be idempotent against state
/// that was already reversed out-of-band.
#[derive(Clone, Copy, Debug, Default)]
pub struct Scheduler;

impl Scheduler {
    pub fn new() -> Self {
        Self
    }

    /// Register `reversal` to run exactly once after `delay`, unless the
    /// returned handle is cancelled first. Does not block the caller.
    pub fn schedule<F>(&self, delay: Duration, reversal: F) -> ReversalHandle
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            reversal.await;
        });

        ReversalHandle { task }
    }
}

/// Cancellation handle for a scheduled reversal.
///
/// Dropping the handle does not cancel the reversal.
#[derive(Debug)]
pub struct ReversalHandle {
    task: JoinHandle<()>,
}

impl ReversalHandle {
    /// Prevent a not-yet-fired reversal from firing. No-op after it fired.
    pub fn cancel(&self) {
        self.task.abort();
    }

    /// Whether the reversal already ran (or was cancelled).
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    async fn settle() {
        // Give spawned reversal tasks a chance to run on the test runtime.
        for _ in 0..4 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn fires_exactly_once_after_the_delay() {
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&fired);

        let scheduler = Scheduler::new();
        let _handle = scheduler.schedule(Duration::from_secs(600), async move {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        settle().await;

        tokio::time::advance(Duration::from_secs(599)).await;
        settle().await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);

        tokio::time::advance(Duration::from_secs(2)).await;
        settle().await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);

        tokio::time::advance(Duration::from_secs(86_400)).await;
        settle().await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_before_due_prevents_firing() {
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&fired);

        let scheduler = Scheduler::new();
        let handle = scheduler.schedule(Duration::from_secs(60), async move {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        settle().await;

        handle.cancel();
        tokio::time::advance(Duration::from_secs(3_600)).await;
        settle().await;

        assert_eq!(fired.load(Ordering::SeqCst), 0);
        assert!(handle.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_after_firing_is_a_no_op() {
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&fired);

        let scheduler = Scheduler::new();
        let handle = scheduler.schedule(Duration::from_secs(5), async move {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        settle().await;

        tokio::time::advance(Duration::from_secs(10)).await;
        settle().await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);

        handle.cancel();
        settle().await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn independent_reversals_fire_independently() {
        let fired = Arc::new(AtomicUsize::new(0));
        let scheduler = Scheduler::new();

        let first = Arc::clone(&fired);
        let _a = scheduler.schedule(Duration::from_secs(10), async move {
            first.fetch_add(1, Ordering::SeqCst);
        });
        let second = Arc::clone(&fired);
        let _b = scheduler.schedule(Duration::from_secs(30), async move {
            second.fetch_add(1, Ordering::SeqCst);
        });
        settle().await;

        tokio::time::advance(Duration::from_secs(15)).await;
        settle().await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);

        tokio::time::advance(Duration::from_secs(20)).await;
        settle().await;
        assert_eq!(fired.load(Ordering::SeqCst), 2);
    }
}

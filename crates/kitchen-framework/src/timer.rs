//! # Cancellable Timers
//!
//! Two shapes of delayed work, both stopped through a [`CancellationToken`]:
//!
//! - [`ScheduledTask`] runs a future once after a delay, unless cancelled first.
//! - [`Ticker`] runs a closure on a fixed period after an initial delay until cancelled.
//!
//! Cancelling a [`ScheduledTask`] that has already started running its body has
//! no effect on that body. Callers that need "fire only if still wanted" semantics
//! must re-check their own state inside the body, under the same lock they use to
//! cancel.

use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// A one-shot delayed task.
#[derive(Debug)]
pub struct ScheduledTask {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

impl ScheduledTask {
    /// Spawns `task` to run after `delay`.
    ///
    /// `token` is usually a child of a system-wide shutdown token so that
    /// shutting down also drops pending timers.
    pub fn spawn<F>(delay: Duration, token: CancellationToken, task: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let guard = token.clone();
        let handle = tokio::spawn(async move {
            tokio::select! {
                _ = guard.cancelled() => {}
                _ = tokio::time::sleep(delay) => task.await,
            }
        });
        Self { token, handle }
    }

    /// Prevents the task body from starting.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// True once the task either ran to completion or observed its cancellation.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

/// A periodic task with an initial delay.
pub struct Ticker {
    name: &'static str,
    period: Duration,
    initial_delay: Duration,
}

impl Ticker {
    pub fn new(name: &'static str, period: Duration, initial_delay: Duration) -> Self {
        Self {
            name,
            period,
            initial_delay,
        }
    }

    /// Spawns the tick loop.
    ///
    /// Ticks that fall behind are skipped rather than bunched up, so a slow
    /// `on_tick` never triggers a burst of catch-up runs.
    pub fn spawn<F, Fut>(self, cancel: CancellationToken, mut on_tick: F) -> JoinHandle<()>
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        tokio::spawn(async move {
            let period = if self.period.is_zero() {
                Duration::from_millis(1)
            } else {
                self.period
            };
            let mut ticker = interval_at(Instant::now() + self.initial_delay, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            info!(
                ticker = self.name,
                period_ms = period.as_millis() as u64,
                initial_delay_ms = self.initial_delay.as_millis() as u64,
                "Ticker started"
            );

            let mut ticks: u64 = 0;
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => {
                        ticks += 1;
                        debug!(ticker = self.name, ticks, "Tick");
                        on_tick().await;
                    }
                }
            }

            info!(ticker = self.name, ticks, "Ticker stopped");
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn test_scheduled_task_runs_after_delay() {
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = fired.clone();
        let task = ScheduledTask::spawn(
            Duration::from_secs(2),
            CancellationToken::new(),
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
            },
        );

        tokio::time::sleep(Duration::from_millis(1900)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert!(task.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_task_never_runs() {
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = fired.clone();
        let task = ScheduledTask::spawn(
            Duration::from_secs(2),
            CancellationToken::new(),
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
            },
        );

        task.cancel();
        assert!(task.is_cancelled());
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticker_honours_initial_delay_and_period() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let counter = ticks.clone();
        let cancel = CancellationToken::new();
        let handle = Ticker::new(
            "test",
            Duration::from_millis(100),
            Duration::from_millis(500),
        )
        .spawn(cancel.clone(), move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        });

        tokio::time::sleep(Duration::from_millis(450)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 0);

        // Ticks at 500, 600, 700.
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 3);

        cancel.cancel();
        handle.await.unwrap();
    }
}

//! Timer loop driving the sweeps
//!
//! One scheduler task owns the watcher's timeline: it fires a sweep
//! immediately at startup and then once per interval. A tick that lands
//! while a sweep is still running is dropped by the orchestrator's
//! reentrancy guard, never queued - combined with
//! [`MissedTickBehavior::Skip`] the loop cannot build up a burst of
//! back-to-back sweeps after a stall.
//!
//! The next fire time is published through an atomic so the CLI and tests
//! can observe the schedule without locking.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::info;

use crate::checker::AppointmentChecker;

/// Interval-driven sweep scheduler
pub struct SweepScheduler {
    checker: Arc<AppointmentChecker>,
    interval: Duration,
    /// Epoch millis of the next scheduled fire; 0 means not running
    next_fire_ms: AtomicI64,
    shutdown: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
}

impl SweepScheduler {
    pub fn new(checker: Arc<AppointmentChecker>, interval: Duration) -> Self {
        let (shutdown, shutdown_rx) = watch::channel(false);
        Self {
            checker,
            interval,
            next_fire_ms: AtomicI64::new(0),
            shutdown,
            shutdown_rx,
        }
    }

    /// When the next sweep is due, if the loop is running
    pub fn next_fire(&self) -> Option<DateTime<Utc>> {
        match self.next_fire_ms.load(Ordering::SeqCst) {
            0 => None,
            ms => DateTime::from_timestamp_millis(ms),
        }
    }

    fn publish_next_fire(&self) {
        let next = Utc::now()
            + chrono::Duration::from_std(self.interval).unwrap_or(chrono::Duration::zero());
        self.next_fire_ms
            .store(next.timestamp_millis(), Ordering::SeqCst);
    }

    /// Request the loop to stop after the current iteration
    pub fn stop(&self) {
        let _ = self.shutdown.send(true);
    }

    /// Run the scheduling loop until [`stop`](Self::stop) is called.
    ///
    /// The first tick fires immediately, giving the sweep-at-startup
    /// behavior; subsequent ticks follow the configured interval.
    pub async fn run(&self) {
        info!(interval_secs = self.interval.as_secs(), "scheduler started");

        let mut shutdown_rx = self.shutdown_rx.clone();
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.publish_next_fire();
                    self.checker.sweep().await;
                }
                _ = shutdown_rx.changed() => {
                    info!("scheduler shutting down");
                    break;
                }
            }
        }

        self.next_fire_ms.store(0, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::CheckerConfig;
    use crate::notify::Notifier;

    fn quiet_checker() -> Arc<AppointmentChecker> {
        Arc::new(AppointmentChecker::new(
            CheckerConfig::default().with_pacing(0, 0),
            Vec::new(),
            Arc::new(Notifier::new()),
        ))
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_sweep_fires_immediately() {
        let checker = quiet_checker();
        let scheduler = Arc::new(SweepScheduler::new(
            Arc::clone(&checker),
            Duration::from_secs(300),
        ));

        let handle = tokio::spawn({
            let scheduler = Arc::clone(&scheduler);
            async move { scheduler.run().await }
        });

        // Let the startup tick run without advancing the clock
        tokio::task::yield_now().await;
        tokio::time::advance(Duration::from_millis(1)).await;
        assert!(checker.state().last_run().is_some());

        scheduler.stop();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_next_fire_is_published_while_running() {
        let scheduler = Arc::new(SweepScheduler::new(quiet_checker(), Duration::from_secs(60)));
        assert!(scheduler.next_fire().is_none());

        let handle = tokio::spawn({
            let scheduler = Arc::clone(&scheduler);
            async move { scheduler.run().await }
        });

        tokio::task::yield_now().await;
        tokio::time::advance(Duration::from_millis(1)).await;
        assert!(scheduler.next_fire().is_some());

        scheduler.stop();
        handle.await.unwrap();
        assert!(scheduler.next_fire().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_interval_drives_repeated_sweeps() {
        let checker = quiet_checker();
        let scheduler = Arc::new(SweepScheduler::new(
            Arc::clone(&checker),
            Duration::from_secs(60),
        ));

        let handle = tokio::spawn({
            let scheduler = Arc::clone(&scheduler);
            async move { scheduler.run().await }
        });

        tokio::task::yield_now().await;
        let first = checker.state().last_run();
        assert!(first.is_some());

        tokio::time::advance(Duration::from_secs(61)).await;
        tokio::task::yield_now().await;
        let second = checker.state().last_run();
        assert!(second >= first);

        scheduler.stop();
        handle.await.unwrap();
    }
}

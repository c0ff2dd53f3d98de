//! Sweep orchestration core
//!
//! This module owns the watcher's only real state machine: the single-flag
//! `Idle -> Running -> Idle` cycle around one sweep. A sweep walks every
//! enabled target, generates that target's probe window fresh, probes each
//! date in ascending order with randomized pacing in between, and dispatches
//! a notification for every date on which slots are found.
//!
//! # Invariants
//!
//! - At most one sweep is active at any time; an invocation that arrives
//!   while a sweep runs is dropped (logged), never queued.
//! - Each target's consecutive-error counter only grows across failed probes
//!   and resets to zero on any successful probe; at the configured threshold
//!   the remainder of that target's window is abandoned for the sweep while
//!   other targets proceed.
//! - The running flag is released even when a probe implementation fails in
//!   an unexpected way, so the reentrancy guard can never wedge the
//!   scheduler permanently.
//!
//! Targets and dates are probed strictly sequentially. Staying polite to
//! rate-limited booking sites matters more than throughput here.

pub mod dates;
pub mod status;

use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU32, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Local, NaiveDate, Utc};
use rand::Rng;
use tracing::{debug, error, info, warn};

use crate::models::{SlotCheck, SweepReport, TargetConfig, TargetReport};
use crate::notify::{self, Notifier};
use crate::probes::TargetProbe;

pub use status::WatcherStatus;

/// Consecutive probe failures before a target's window is abandoned
pub const DEFAULT_ERROR_THRESHOLD: u32 = 5;

/// Orchestrator tuning knobs
#[derive(Debug, Clone)]
pub struct CheckerConfig {
    /// Lower bound of the randomized inter-probe delay (ms)
    pub pacing_min_ms: u64,

    /// Upper bound of the randomized inter-probe delay (ms)
    pub pacing_max_ms: u64,

    /// Circuit breaker threshold
    pub error_threshold: u32,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            pacing_min_ms: 1000,
            pacing_max_ms: 3000,
            error_threshold: DEFAULT_ERROR_THRESHOLD,
        }
    }
}

impl CheckerConfig {
    /// Set the pacing delay bounds
    pub fn with_pacing(mut self, min_ms: u64, max_ms: u64) -> Self {
        self.pacing_min_ms = min_ms;
        self.pacing_max_ms = max_ms;
        self
    }

    /// Set the circuit breaker threshold
    pub fn with_error_threshold(mut self, threshold: u32) -> Self {
        self.error_threshold = threshold;
        self
    }
}

/// One registered target: immutable settings plus its probe implementation
pub struct Target {
    pub config: TargetConfig,
    pub probe: Box<dyn TargetProbe>,
}

impl Target {
    pub fn new(config: TargetConfig, probe: Box<dyn TargetProbe>) -> Self {
        Self { config, probe }
    }
}

struct TargetCounter {
    name: String,
    consecutive_errors: AtomicU32,
}

/// Shared run state, readable concurrently with an in-progress sweep.
///
/// All fields are word-sized atomics: the status endpoint only needs reads
/// that are never torn, and staleness-by-one-event is acceptable for a
/// liveness probe.
pub struct RunState {
    is_running: AtomicBool,
    started_at: Instant,
    /// Epoch millis of the last completed sweep; 0 means never
    last_run_ms: AtomicI64,
    counters: Vec<TargetCounter>,
}

impl RunState {
    pub fn new(target_names: Vec<String>) -> Self {
        Self {
            is_running: AtomicBool::new(false),
            started_at: Instant::now(),
            last_run_ms: AtomicI64::new(0),
            counters: target_names
                .into_iter()
                .map(|name| TargetCounter {
                    name,
                    consecutive_errors: AtomicU32::new(0),
                })
                .collect(),
        }
    }

    /// Attempt the `Idle -> Running` transition. Returns false when a sweep
    /// is already active.
    fn begin_sweep(&self) -> bool {
        self.is_running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    fn end_sweep(&self) {
        self.is_running.store(false, Ordering::SeqCst);
    }

    pub fn is_running(&self) -> bool {
        self.is_running.load(Ordering::SeqCst)
    }

    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }

    /// Record a completed sweep
    pub fn mark_completed(&self) {
        self.last_run_ms
            .store(Utc::now().timestamp_millis(), Ordering::SeqCst);
    }

    /// Timestamp of the last completed sweep, if any
    pub fn last_run(&self) -> Option<DateTime<Utc>> {
        match self.last_run_ms.load(Ordering::SeqCst) {
            0 => None,
            ms => DateTime::from_timestamp_millis(ms),
        }
    }

    /// Increment a target's consecutive-error counter, returning the new count
    pub fn record_error(&self, target_idx: usize) -> u32 {
        match self.counters.get(target_idx) {
            Some(counter) => counter.consecutive_errors.fetch_add(1, Ordering::SeqCst) + 1,
            None => 0,
        }
    }

    /// Reset a target's consecutive-error counter after a successful probe
    pub fn record_success(&self, target_idx: usize) {
        if let Some(counter) = self.counters.get(target_idx) {
            counter.consecutive_errors.store(0, Ordering::SeqCst);
        }
    }

    /// Consecutive-error count for a named target
    pub fn errors_for(&self, name: &str) -> u32 {
        self.counters
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.consecutive_errors.load(Ordering::SeqCst))
            .unwrap_or(0)
    }

    /// Highest consecutive-error count across all targets
    pub fn max_consecutive_errors(&self) -> u32 {
        self.counters
            .iter()
            .map(|c| c.consecutive_errors.load(Ordering::SeqCst))
            .max()
            .unwrap_or(0)
    }
}

/// Releases the running flag when a sweep scope exits, normally or not
struct RunGuard<'a> {
    state: &'a RunState,
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.state.end_sweep();
    }
}

/// The sweep orchestrator
///
/// Owns the run state, the registered targets and the notifier. One instance
/// exists for the process lifetime; there is no ambient or global state, so
/// tests construct their own instance with scripted probes.
pub struct AppointmentChecker {
    config: CheckerConfig,
    targets: Vec<Target>,
    notifier: Arc<Notifier>,
    state: Arc<RunState>,
    today_override: Option<NaiveDate>,
}

impl AppointmentChecker {
    pub fn new(config: CheckerConfig, targets: Vec<Target>, notifier: Arc<Notifier>) -> Self {
        let names = targets.iter().map(|t| t.config.name.clone()).collect();
        Self {
            config,
            targets,
            notifier,
            state: Arc::new(RunState::new(names)),
            today_override: None,
        }
    }

    /// Pin "today" to a fixed date so tests can exercise exact windows
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today_override = Some(today);
        self
    }

    /// Shared handle to the run state, for the liveness endpoint
    pub fn state(&self) -> Arc<RunState> {
        Arc::clone(&self.state)
    }

    /// Current status projection
    pub fn status(&self) -> WatcherStatus {
        WatcherStatus::from_state(&self.state)
    }

    fn today(&self) -> NaiveDate {
        self.today_override
            .unwrap_or_else(|| Local::now().date_naive())
    }

    /// Run one full sweep across all enabled targets.
    ///
    /// Reentrant invocations are dropped: if a sweep is already running this
    /// returns a skipped report without probing anything. The sweep counts as
    /// the last successful run once it completes, even when some targets were
    /// aborted by their circuit breaker.
    pub async fn sweep(&self) -> SweepReport {
        if !self.state.begin_sweep() {
            warn!("previous sweep still running, skipping this interval");
            return SweepReport::skipped();
        }
        let _guard = RunGuard { state: &self.state };

        let enabled = self.targets.iter().filter(|t| t.config.enabled).count();
        info!(targets = enabled, "starting sweep");

        let mut reports = Vec::new();
        for (idx, target) in self.targets.iter().enumerate() {
            if !target.config.enabled {
                debug!(target = %target.config.name, "target disabled, skipping");
                continue;
            }
            reports.push(self.sweep_target(idx, target).await);
        }

        self.state.mark_completed();
        info!(
            discoveries = reports.iter().map(|r: &TargetReport| r.discoveries).sum::<usize>(),
            "sweep complete"
        );

        SweepReport {
            skipped: false,
            targets: reports,
        }
    }

    /// Probe one target across its date window
    async fn sweep_target(&self, idx: usize, target: &Target) -> TargetReport {
        let name = &target.config.name;
        let mut report = TargetReport::new(name.clone());

        let window = dates::date_window(self.today(), target.config.date_limit.as_deref());
        if window.is_empty() {
            info!(target = %name, "no dates remaining to check");
            return report;
        }
        info!(target = %name, count = window.len(), "checking dates");

        for date in window {
            report.dates_checked += 1;

            match target.probe.check(date).await {
                Ok(SlotCheck::Found(slots)) => {
                    self.state.record_success(idx);
                    report.discoveries += 1;
                    info!(target = %name, date = %dates::format_date(date), slots = slots.len(), "slots found");

                    let message = notify::discovery_message(&target.config, date, &slots);
                    self.notifier.notify(&message).await;
                }
                Ok(SlotCheck::NotFound) => {
                    self.state.record_success(idx);
                    debug!(target = %name, date = %dates::format_date(date), "no slots");
                }
                Err(err) => {
                    let errors = self.state.record_error(idx);
                    report.errors += 1;
                    error!(
                        target = %name,
                        date = %dates::format_date(date),
                        consecutive_errors = errors,
                        "probe failed: {err}"
                    );

                    if errors >= self.config.error_threshold {
                        warn!(target = %name, "too many consecutive errors, aborting remaining dates");
                        report.aborted = true;
                        break;
                    }
                }
            }

            self.pace().await;
        }

        report
    }

    /// Randomized inter-probe delay. Suspends only this sweep's continuation;
    /// the liveness endpoint and other tasks keep running.
    async fn pace(&self) {
        let (min, max) = (self.config.pacing_min_ms, self.config.pacing_max_ms);
        if max == 0 {
            return;
        }
        let wait_ms = if max > min {
            rand::thread_rng().gen_range(min..=max)
        } else {
            min
        };
        tokio::time::sleep(Duration::from_millis(wait_ms)).await;
    }
}

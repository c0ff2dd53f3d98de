// Core data structures for the vigia watcher

use serde::{Deserialize, Serialize};

/// A bookable time slot offered by a target site
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    /// Human-readable time label as the site presents it (e.g. "10:20")
    pub label: String,
}

impl Slot {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }
}

/// Outcome of probing one target for one date
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotCheck {
    /// The target offers no slots on the requested date
    NotFound,
    /// The target offers at least one slot on the requested date
    Found(Vec<Slot>),
}

/// Immutable per-target settings, fixed after load
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetConfig {
    /// Short identifier used in logs and notifications (e.g. "madrid")
    pub name: String,

    /// Whether this target participates in sweeps
    pub enabled: bool,

    /// Optional end of the probe window, format DD/MM/YYYY, inclusive.
    /// Falls back to a 30-day window when absent or unparseable.
    pub date_limit: Option<String>,

    /// Public booking page linked from discovery notifications
    pub booking_url: String,
}

impl TargetConfig {
    pub fn new(name: impl Into<String>, booking_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            enabled: true,
            date_limit: None,
            booking_url: booking_url.into(),
        }
    }

    /// Set the probe window limit (DD/MM/YYYY)
    pub fn with_date_limit(mut self, limit: impl Into<String>) -> Self {
        self.date_limit = Some(limit.into());
        self
    }
}

/// Per-target accounting for one sweep
#[derive(Debug, Clone, Serialize)]
pub struct TargetReport {
    pub name: String,

    /// Dates actually probed (dates past a tripped breaker are not counted)
    pub dates_checked: usize,

    /// Dates on which slots were found and a notification was dispatched
    pub discoveries: usize,

    /// Probe failures observed for this target during the sweep
    pub errors: usize,

    /// True when the circuit breaker aborted the remainder of the window
    pub aborted: bool,
}

impl TargetReport {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            dates_checked: 0,
            discoveries: 0,
            errors: 0,
            aborted: false,
        }
    }
}

/// Accounting for one full sweep across all enabled targets
#[derive(Debug, Clone, Serialize)]
pub struct SweepReport {
    /// True when the reentrancy guard dropped this invocation
    pub skipped: bool,

    pub targets: Vec<TargetReport>,
}

impl SweepReport {
    /// Report for an invocation dropped by the reentrancy guard
    pub fn skipped() -> Self {
        Self {
            skipped: true,
            targets: Vec::new(),
        }
    }

    /// Total discoveries across all targets
    pub fn discoveries(&self) -> usize {
        self.targets.iter().map(|t| t.discoveries).sum()
    }

    /// Total dates probed across all targets
    pub fn dates_checked(&self) -> usize {
        self.targets.iter().map(|t| t.dates_checked).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_config_builder() {
        let config = TargetConfig::new("madrid", "https://example.com/book")
            .with_date_limit("15/02/2026");

        assert_eq!(config.name, "madrid");
        assert!(config.enabled);
        assert_eq!(config.date_limit.as_deref(), Some("15/02/2026"));
    }

    #[test]
    fn test_sweep_report_totals() {
        let mut report = SweepReport {
            skipped: false,
            targets: vec![TargetReport::new("a"), TargetReport::new("b")],
        };
        report.targets[0].discoveries = 2;
        report.targets[0].dates_checked = 10;
        report.targets[1].discoveries = 1;
        report.targets[1].dates_checked = 5;

        assert_eq!(report.discoveries(), 3);
        assert_eq!(report.dates_checked(), 15);
    }

    #[test]
    fn test_skipped_report() {
        let report = SweepReport::skipped();
        assert!(report.skipped);
        assert!(report.targets.is_empty());
        assert_eq!(report.discoveries(), 0);
    }
}

//! vigia - Appointment slot watcher
//!
//! A long-running poller that sweeps Spanish appointment-booking portals for
//! newly opened slots and raises a Telegram alert the moment one is observed.
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - [`config`] - Configuration management and settings
//! - [`checker`] - The sweep orchestrator, date windows and run state
//! - [`scheduler`] - The interval loop driving sweeps
//! - [`probes`] - One probe per booking site behind a uniform capability
//! - [`notify`] - Best-effort notification channels
//! - [`server`] - Liveness endpoint and keep-alive ping
//! - [`models`] - Core data structures and types
//! - [`utils`] - Common utilities and helpers
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use vigia::checker::{AppointmentChecker, CheckerConfig, Target};
//! use vigia::models::TargetConfig;
//! use vigia::notify::Notifier;
//! use vigia::probes::StaticProbe;
//!
//! #[tokio::main]
//! async fn main() {
//!     let target = Target::new(
//!         TargetConfig::new("demo", "https://example.com/book"),
//!         Box::new(StaticProbe::empty("demo")),
//!     );
//!     let checker = AppointmentChecker::new(
//!         CheckerConfig::default(),
//!         vec![target],
//!         Arc::new(Notifier::new()),
//!     );
//!     let report = checker.sweep().await;
//!     println!("checked {} dates", report.dates_checked());
//! }
//! ```

pub mod checker;
pub mod config;
pub mod error;
pub mod models;
pub mod notify;
pub mod probes;
pub mod scheduler;
pub mod server;
pub mod utils;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::checker::{AppointmentChecker, CheckerConfig, RunState, Target, WatcherStatus};
    pub use crate::config::Config;
    pub use crate::error::{Error, ErrorCategory, Result, VigiaErrorTrait};
    pub use crate::models::{Slot, SlotCheck, SweepReport, TargetConfig, TargetReport};
    pub use crate::notify::{Channel, Notifier};
    pub use crate::probes::TargetProbe;
    pub use crate::scheduler::SweepScheduler;
}

// Direct re-exports for convenience
pub use models::{Slot, SlotCheck, SweepReport, TargetConfig};

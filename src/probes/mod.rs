//! Target probes for the booking sites being watched
//!
//! Every external site is modelled as the same capability: given one calendar
//! date, answer whether that site offers bookable slots on it. The
//! orchestrator loop is written once against [`TargetProbe`]; adding a site
//! means implementing the trait, not branching on site names.
//!
//! Implementations:
//!
//! - [`madrid`] - JSON slot-lookup API
//! - [`alicante`] - HTML booking page, scraped for offered dates
//! - [`sede`] - secondary system with a heuristic availability signal
//! - [`simulated`] - canned results for simulate mode and tests

pub mod alicante;
pub mod client;
pub mod madrid;
pub mod sede;
pub mod simulated;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::models::SlotCheck;
use crate::utils::error::ProbeError;

// Re-export probe implementations
pub use alicante::AlicanteProbe;
pub use client::ProbeClient;
pub use madrid::MadridProbe;
pub use sede::SedeProbe;
pub use simulated::StaticProbe;

/// Uniform per-date probe capability, one implementation per site.
///
/// `check` must resolve within the implementation's configured timeout; a
/// hung endpoint surfaces as `ProbeError::Timeout`, never as an indefinite
/// await.
#[async_trait]
pub trait TargetProbe: Send + Sync {
    /// Short identifier used in logs
    fn name(&self) -> &str;

    /// Probe the site for bookable slots on the given date
    async fn check(&self, date: NaiveDate) -> Result<SlotCheck, ProbeError>;
}

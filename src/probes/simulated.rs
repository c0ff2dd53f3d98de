//! Canned probe for simulate mode and tests
//!
//! Substituted for every live probe when `SIMULATE=true`, so the whole
//! pipeline (window generation, pacing, breaker, notification formatting)
//! can be exercised without touching a third-party site.

use async_trait::async_trait;
use chrono::NaiveDate;

use super::TargetProbe;
use crate::models::{Slot, SlotCheck};
use crate::utils::error::ProbeError;

/// Probe returning a fixed canned result set, no network I/O
pub struct StaticProbe {
    name: String,
    offered: Vec<NaiveDate>,
    slots: Vec<Slot>,
}

impl StaticProbe {
    /// Probe that offers the given dates, with a default slot label
    pub fn offering(name: impl Into<String>, offered: Vec<NaiveDate>) -> Self {
        Self {
            name: name.into(),
            offered,
            slots: vec![Slot::new("10:00"), Slot::new("10:20")],
        }
    }

    /// Probe that never finds anything
    pub fn empty(name: impl Into<String>) -> Self {
        Self::offering(name, Vec::new())
    }

    /// Override the slot labels returned on a hit
    pub fn with_slots(mut self, slots: Vec<Slot>) -> Self {
        self.slots = slots;
        self
    }
}

#[async_trait]
impl TargetProbe for StaticProbe {
    fn name(&self) -> &str {
        &self.name
    }

    async fn check(&self, date: NaiveDate) -> Result<SlotCheck, ProbeError> {
        if self.offered.contains(&date) {
            Ok(SlotCheck::Found(self.slots.clone()))
        } else {
            Ok(SlotCheck::NotFound)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn test_offering_hits_only_listed_dates() {
        let probe = StaticProbe::offering("sim", vec![date(2026, 2, 15)]);

        assert!(matches!(
            probe.check(date(2026, 2, 15)).await.unwrap(),
            SlotCheck::Found(_)
        ));
        assert_eq!(
            probe.check(date(2026, 2, 16)).await.unwrap(),
            SlotCheck::NotFound
        );
    }

    #[tokio::test]
    async fn test_empty_probe_never_hits() {
        let probe = StaticProbe::empty("sim");
        assert_eq!(
            probe.check(date(2026, 2, 15)).await.unwrap(),
            SlotCheck::NotFound
        );
    }
}

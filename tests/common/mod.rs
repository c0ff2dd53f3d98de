//! Common test utilities

// Not every test binary uses every helper
#![allow(dead_code)]

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use vigia::models::{Slot, SlotCheck, TargetConfig};
use vigia::notify::Channel;
use vigia::probes::TargetProbe;
use vigia::utils::error::{NotifyError, ProbeError};

/// One scripted probe outcome
#[derive(Debug, Clone)]
pub enum Outcome {
    Found(Vec<Slot>),
    NotFound,
    Error,
}

/// Probe that replays a fixed outcome script, then answers NotFound.
/// Records every date it was asked about.
pub struct ScriptedProbe {
    name: String,
    script: Mutex<VecDeque<Outcome>>,
    probed: Arc<Mutex<Vec<NaiveDate>>>,
}

impl ScriptedProbe {
    pub fn new(name: impl Into<String>, script: Vec<Outcome>) -> Self {
        Self {
            name: name.into(),
            script: Mutex::new(script.into()),
            probed: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Probe answering NotFound forever
    pub fn quiet(name: impl Into<String>) -> Self {
        Self::new(name, Vec::new())
    }

    /// Handle to the recorded probe dates
    pub fn probed(&self) -> Arc<Mutex<Vec<NaiveDate>>> {
        Arc::clone(&self.probed)
    }
}

#[async_trait]
impl TargetProbe for ScriptedProbe {
    fn name(&self) -> &str {
        &self.name
    }

    async fn check(&self, date: NaiveDate) -> Result<SlotCheck, ProbeError> {
        self.probed.lock().unwrap().push(date);

        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(Outcome::Found(slots)) => Ok(SlotCheck::Found(slots)),
            Some(Outcome::NotFound) | None => Ok(SlotCheck::NotFound),
            Some(Outcome::Error) => Err(ProbeError::ServerError(500)),
        }
    }
}

/// Channel that records delivered messages instead of sending them
pub struct RecordingChannel {
    messages: Arc<Mutex<Vec<String>>>,
}

impl RecordingChannel {
    pub fn new() -> (Self, Arc<Mutex<Vec<String>>>) {
        let messages = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                messages: Arc::clone(&messages),
            },
            messages,
        )
    }
}

#[async_trait]
impl Channel for RecordingChannel {
    fn name(&self) -> &str {
        "recording"
    }

    async fn send(&self, message: &str) -> Result<(), NotifyError> {
        self.messages.lock().unwrap().push(message.to_string());
        Ok(())
    }
}

/// Target config for tests
pub fn target_config(name: &str, date_limit: Option<&str>) -> TargetConfig {
    let mut config = TargetConfig::new(name, "https://example.com/book");
    config.date_limit = date_limit.map(String::from);
    config
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

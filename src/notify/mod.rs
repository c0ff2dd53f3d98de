//! Notification delivery for slot discoveries
//!
//! A [`Notifier`] fans a message out to its registered channels. Delivery is
//! strictly best-effort: a failed channel is logged and skipped, never
//! retried, and never surfaces to the sweep that triggered it - losing one
//! alert is preferable to stalling the watcher.

pub mod telegram;

use async_trait::async_trait;
use chrono::NaiveDate;
use tracing::error;

use crate::checker::dates;
use crate::models::{Slot, TargetConfig};
use crate::utils::error::NotifyError;

pub use telegram::TelegramChannel;

/// A notification delivery channel
#[async_trait]
pub trait Channel: Send + Sync {
    /// Channel identifier used in logs
    fn name(&self) -> &str;

    /// Deliver one message
    async fn send(&self, message: &str) -> Result<(), NotifyError>;
}

/// Routes messages to all registered channels
#[derive(Default)]
pub struct Notifier {
    channels: Vec<Box<dyn Channel>>,
}

impl Notifier {
    pub fn new() -> Self {
        Self {
            channels: Vec::new(),
        }
    }

    /// Register a delivery channel
    pub fn add_channel(&mut self, channel: Box<dyn Channel>) {
        self.channels.push(channel);
    }

    /// Number of registered channels
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Deliver a message to every channel, best-effort
    pub async fn notify(&self, message: &str) {
        for channel in &self.channels {
            if let Err(e) = channel.send(message).await {
                error!(channel = channel.name(), "notification delivery failed: {e}");
            }
        }
    }
}

/// Build the alert message for a slot discovery
pub fn discovery_message(target: &TargetConfig, date: NaiveDate, slots: &[Slot]) -> String {
    let labels: Vec<&str> = slots.iter().map(|s| s.label.as_str()).collect();
    format!(
        "🚨 <b>{} CITA FOUND for {}!</b> 🚨\n\nSlots: {}\n\n<a href=\"{}\">Book Now</a>",
        target.name.to_uppercase(),
        dates::format_date(date),
        labels.join(", "),
        target.booking_url
    )
}

/// Build the optional startup heartbeat message
pub fn heartbeat_message(interval_secs: u64, targets: &[String], simulate: bool) -> String {
    let mut message = format!(
        "🤖 <b>vigia started</b>\nCheck interval: {interval_secs}s\nTargets: {}",
        targets.join(", ")
    );
    if simulate {
        message.push_str("\nMode: simulate");
    }
    message
}

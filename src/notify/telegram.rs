//! Telegram notification channel
//!
//! Delivers alerts through the Telegram Bot API with HTML formatting. The
//! channel is only constructed when both the bot token and the chat id are
//! configured; otherwise the watcher runs without notifications and says so
//! once at startup.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use std::time::Duration;
use tracing::info;

use super::Channel;
use crate::config::TelegramConfig;
use crate::utils::error::NotifyError;

/// Telegram Bot API channel
pub struct TelegramChannel {
    client: Client,
    url: String,
    chat_id: String,
}

impl TelegramChannel {
    /// Create a channel for the given bot token and chat
    pub fn new(
        bot_token: &str,
        chat_id: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, NotifyError> {
        if bot_token.is_empty() {
            return Err(NotifyError::InvalidConfig(String::from(
                "bot token cannot be empty",
            )));
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(NotifyError::Http)?;

        Ok(Self {
            client,
            url: format!("https://api.telegram.org/bot{bot_token}/sendMessage"),
            chat_id: chat_id.into(),
        })
    }

    /// Build a channel from config; `None` when credentials are missing
    pub fn from_config(config: &TelegramConfig) -> Result<Option<Self>, NotifyError> {
        match (&config.bot_token, &config.chat_id) {
            (Some(token), Some(chat_id)) => Ok(Some(Self::new(
                token,
                chat_id.clone(),
                Duration::from_secs(config.timeout_secs),
            )?)),
            _ => Ok(None),
        }
    }

    /// API endpoint override for tests with a mock server
    #[doc(hidden)]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }
}

#[async_trait]
impl Channel for TelegramChannel {
    fn name(&self) -> &str {
        "telegram"
    }

    async fn send(&self, message: &str) -> Result<(), NotifyError> {
        let payload = json!({
            "chat_id": self.chat_id,
            "text": message,
            "parse_mode": "HTML",
        });

        let response = self.client.post(&self.url).json(&payload).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(NotifyError::ServerError(status.as_u16()));
        }

        info!("telegram notification sent");
        Ok(())
    }
}

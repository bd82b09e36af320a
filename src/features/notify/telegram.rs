//! Telegram Bot API sender.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::{debug, error};

use super::Notifier;

/// Hard ceiling on one delivery attempt, connect included. A hung send must
/// not stall the scheduler cycle it runs in.
const SEND_TIMEOUT: Duration = Duration::from_secs(10);

pub struct TelegramNotifier {
    http: reqwest::Client,
    url: String,
    chat_id: String,
}

impl TelegramNotifier {
    pub fn new(bot_token: &str, chat_id: &str) -> Result<TelegramNotifier> {
        let http = reqwest::Client::builder()
            .timeout(SEND_TIMEOUT)
            .build()
            .context("failed to build Telegram HTTP client")?;
        Ok(TelegramNotifier {
            http,
            url: format!("https://api.telegram.org/bot{bot_token}/sendMessage"),
            chat_id: chat_id.to_string(),
        })
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, message: &str) -> bool {
        let payload = serde_json::json!({
            "chat_id": self.chat_id,
            "text": message,
            "parse_mode": "HTML",
        });

        match self.http.post(&self.url).json(&payload).send().await {
            Ok(response) if response.status().is_success() => {
                debug!("Telegram message delivered");
                true
            }
            Ok(response) => {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                error!("Telegram API error (HTTP {status}): {body}");
                false
            }
            Err(e) => {
                error!("Telegram delivery failed: {e}");
                false
            }
        }
    }
}

use crate::config::TelegramConfig;
use crate::error::{PulseError, Result};
use crate::retry::{retry_with_backoff, BackoffPolicy};
use serde_json::{json, Value};
use std::time::Duration;

#[derive(Clone)]
pub struct TelegramClient {
    http: reqwest::Client,
    base_url: String,
    config: TelegramConfig,
    policy: BackoffPolicy,
}

impl TelegramClient {
    pub fn new(config: &TelegramConfig, policy: BackoffPolicy) -> Self {
        Self::with_base_url("https://api.telegram.org", config, policy)
    }

    pub fn with_base_url(
        base_url: impl Into<String>,
        config: &TelegramConfig,
        policy: BackoffPolicy,
    ) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .user_agent("Pulse-Bot/0.1.0")
            .build()
            .unwrap_or_else(|e| {
                tracing::error!("Failed to build HTTP client: {}", e);
                reqwest::Client::new()
            });
        Self {
            http,
            base_url: base_url.into(),
            config: config.clone(),
            policy,
        }
    }

    /// Deliver one message to the configured chat, retrying with linear
    /// backoff. Success returns the Telegram acknowledgement unchanged; once
    /// attempts are exhausted the last error is propagated as
    /// `DeliveryFailed`.
    pub async fn send(&self, text: &str) -> Result<Value> {
        let token = self
            .config
            .bot_token
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| PulseError::config_error("TELEGRAM_BOT_TOKEN is not set"))?;
        let chat_id = self
            .config
            .chat_id
            .as_deref()
            .filter(|c| !c.is_empty())
            .ok_or_else(|| PulseError::config_error("CHAT_ID is not set"))?;

        let max_attempts = self.policy.max_attempts.max(1);
        retry_with_backoff(&self.policy, |_attempt| {
            self.send_once(token, chat_id, text)
        })
        .await
        .map_err(|e| PulseError::DeliveryFailed {
            attempts: max_attempts,
            last_error: e.to_string(),
        })
    }

    async fn send_once(&self, token: &str, chat_id: &str, text: &str) -> Result<Value> {
        let url = format!("{}/bot{}/sendMessage", self.base_url, token);
        let response = self
            .http
            .post(&url)
            .json(&json!({
                "chat_id": chat_id,
                "text": text,
                "parse_mode": "Markdown",
            }))
            .send()
            .await?
            .error_for_status()?
            .json::<Value>()
            .await?;
        Ok(response)
    }
}

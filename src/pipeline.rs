use crate::error::{PulseError, Result};
use crate::format;
use crate::source::{FetchOutcome, PriceSnapshot, PriceSource};
use crate::telegram::TelegramClient;
use chrono::Utc;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;

/// Everything one pipeline run produced, for the on-demand HTTP response.
#[derive(Debug, Clone)]
pub struct UpdateReport {
    pub message: String,
    pub prices: Option<PriceSnapshot>,
    pub telegram_response: Value,
}

pub struct UpdatePipeline {
    source: PriceSource,
    telegram: TelegramClient,
}

impl UpdatePipeline {
    pub fn new(source: PriceSource, telegram: TelegramClient) -> Self {
        Self { source, telegram }
    }

    /// One fetch-format-deliver cycle. An upstream rate limit short-circuits
    /// before any delivery; a plain fetch failure degrades to the fixed error
    /// message, which is still sent to the chat.
    pub async fn run_update(&self) -> Result<UpdateReport> {
        tracing::info!("Running price update");

        let snapshot = match self.source.fetch().await {
            FetchOutcome::Prices(snapshot) => Some(snapshot),
            FetchOutcome::RateLimited(message) => {
                return Err(PulseError::RateLimited { message });
            }
            FetchOutcome::Unavailable => None,
        };

        let message = format::price_update_message(snapshot.as_ref(), Utc::now());
        let telegram_response = self.telegram.send(&message).await?;
        tracing::info!("Price update delivered");

        Ok(UpdateReport {
            message,
            prices: snapshot,
            telegram_response,
        })
    }

    /// Fire-and-forget run at process startup. Failures are logged, never
    /// silently dropped.
    pub fn spawn_startup_run(self: &Arc<Self>) {
        let pipeline = Arc::clone(self);
        tokio::spawn(async move {
            if let Err(e) = pipeline.run_update().await {
                tracing::error!("Startup price update failed: {}", e);
            }
        });
    }

    /// Recurring timer trigger. A failed run is logged and the timer keeps
    /// ticking; it is never stopped or rescheduled based on run outcome.
    pub fn spawn_recurring(self: &Arc<Self>, interval_secs: u64) {
        let pipeline = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker =
                tokio::time::interval(Duration::from_secs(interval_secs.max(1)));
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // interval fires immediately; the startup run already covers that
            ticker.tick().await;
            loop {
                ticker.tick().await;
                if let Err(e) = pipeline.run_update().await {
                    tracing::error!("Scheduled price update failed: {}", e);
                }
            }
        });
    }
}

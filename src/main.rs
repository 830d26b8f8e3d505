use anyhow::Result;
use pulse_bot::http::{self, AppState};
use pulse_bot::retry::BackoffPolicy;
use pulse_bot::source::PriceSource;
use pulse_bot::telegram::TelegramClient;
use pulse_bot::{PulseConfig, UpdatePipeline};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pulse_bot=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load .env for local dev (if present)
    if dotenvy::dotenv().is_ok() {
        tracing::info!("Loaded .env");
    }

    tracing::info!("Starting Pulse price bot");

    // Load configuration
    let config = PulseConfig::from_env()?;
    tracing::info!(
        "Configuration loaded: port={}, interval={}s, bot_token={}, chat_id={}",
        config.server.port,
        config.updater.interval_secs,
        config.telegram.has_bot_token(),
        config.telegram.has_chat_id()
    );

    let policy = BackoffPolicy::new(config.updater.max_send_attempts, Duration::from_secs(1));
    let source = PriceSource::new();
    let telegram = TelegramClient::new(&config.telegram, policy);
    let pipeline = Arc::new(UpdatePipeline::new(source, telegram));

    // Initial update plus the recurring timer; neither blocks the server
    pipeline.spawn_startup_run();
    pipeline.spawn_recurring(config.updater.interval_secs);

    let state = AppState { pipeline, config };
    http::run_http_server(state).await?;

    Ok(())
}

use crate::error::{PulseError, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PulseConfig {
    pub server: ServerConfig,
    pub telegram: TelegramConfig,
    pub updater: UpdaterConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub log_level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    // Absence is not an error at startup; it surfaces when delivery is attempted
    pub bot_token: Option<String>,
    pub chat_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdaterConfig {
    pub interval_secs: u64,
    pub max_send_attempts: u32,
}

impl TelegramConfig {
    pub fn has_bot_token(&self) -> bool {
        self.bot_token.as_deref().is_some_and(|t| !t.is_empty())
    }

    pub fn has_chat_id(&self) -> bool {
        self.chat_id.as_deref().is_some_and(|c| !c.is_empty())
    }
}

impl Default for PulseConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                port: 3000,
                log_level: "info".to_string(),
            },
            telegram: TelegramConfig {
                bot_token: None,
                chat_id: None,
            },
            updater: UpdaterConfig {
                interval_secs: 60,
                max_send_attempts: 3,
            },
        }
    }
}

impl PulseConfig {
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        // Override with environment variables
        if let Ok(port) = std::env::var("PORT") {
            config.server.port = port
                .parse()
                .map_err(|_| PulseError::config_error("Invalid PORT"))?;
        }

        if let Ok(log_level) = std::env::var("PULSE_LOG_LEVEL") {
            config.server.log_level = log_level;
        }

        config.telegram.bot_token = std::env::var("TELEGRAM_BOT_TOKEN").ok();
        config.telegram.chat_id = std::env::var("CHAT_ID").ok();

        if let Ok(interval) = std::env::var("PULSE_UPDATE_INTERVAL_SECS") {
            config.updater.interval_secs = interval
                .parse()
                .map_err(|_| PulseError::config_error("Invalid PULSE_UPDATE_INTERVAL_SECS"))?;
        }

        if let Ok(attempts) = std::env::var("PULSE_MAX_SEND_ATTEMPTS") {
            config.updater.max_send_attempts = attempts
                .parse()
                .map_err(|_| PulseError::config_error("Invalid PULSE_MAX_SEND_ATTEMPTS"))?;
        }

        Ok(config)
    }

    pub fn from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| PulseError::config_error(format!("Failed to read config file: {}", e)))?;

        let config: PulseConfig = toml::from_str(&content)
            .map_err(|e| PulseError::config_error(format!("Failed to parse config file: {}", e)))?;

        Ok(config)
    }
}

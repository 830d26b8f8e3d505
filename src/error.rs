use thiserror::Error;

pub type Result<T> = std::result::Result<T, PulseError>;

#[derive(Error, Debug)]
pub enum PulseError {
    #[error("API error: {0}")]
    Api(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Upstream rate limit: {message}")]
    RateLimited { message: String },

    #[error("Delivery failed after {attempts} attempts: {last_error}")]
    DeliveryFailed { attempts: u32, last_error: String },
}

impl PulseError {
    pub fn api_error(msg: impl Into<String>) -> Self {
        PulseError::Api(msg.into())
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        PulseError::Config(msg.into())
    }

    pub fn rate_limited(msg: impl Into<String>) -> Self {
        PulseError::RateLimited {
            message: msg.into(),
        }
    }
}

pub mod config;
pub mod error;
pub mod format;
pub mod http;
pub mod pipeline;
pub mod retry;
pub mod source;
pub mod telegram;

pub use config::PulseConfig;
pub use error::{PulseError, Result};
pub use pipeline::{UpdatePipeline, UpdateReport};

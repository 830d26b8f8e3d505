use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// The fixed asset basket: CoinGecko id paired with the display name used in
/// the chat message. The basket never changes at runtime.
pub const ASSETS: [(&str, &str); 6] = [
    ("bitcoin", "Bitcoin"),
    ("ethereum", "Ethereum"),
    ("binancecoin", "BNB"),
    ("ripple", "XRP"),
    ("cardano", "Cardano"),
    ("nodecoin", "Node-Coin"),
];

/// One asset's fields as returned by the simple/price endpoint.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct AssetQuote {
    pub usd: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usd_market_cap: Option<f64>,
}

/// One fetched set of quotes, keyed by asset id. Produced fresh on every
/// fetch and discarded after formatting.
pub type PriceSnapshot = BTreeMap<String, AssetQuote>;

/// Result of one fetch. `Unavailable` is the recovered-locally sentinel for
/// transport and HTTP failures; `RateLimited` carries the upstream message so
/// the pipeline can surface it distinctly.
#[derive(Debug, Clone)]
pub enum FetchOutcome {
    Prices(PriceSnapshot),
    RateLimited(String),
    Unavailable,
}

#[derive(Clone)]
pub struct PriceSource {
    http: reqwest::Client,
    base_url: String,
}

impl PriceSource {
    pub fn new() -> Self {
        Self::with_base_url("https://api.coingecko.com/api/v3")
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
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
        }
    }

    /// Issue one GET for the whole basket. No retry here: any transport or
    /// non-2xx failure is logged and collapses to `Unavailable`.
    pub async fn fetch(&self) -> FetchOutcome {
        let ids = ASSETS
            .iter()
            .map(|(id, _)| *id)
            .collect::<Vec<_>>()
            .join(",");
        let url = format!("{}/simple/price", self.base_url);

        let response = match self
            .http
            .get(&url)
            .query(&[
                ("ids", ids.as_str()),
                ("vs_currencies", "usd"),
                ("include_market_cap", "true"),
            ])
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(e) => {
                tracing::error!("Error fetching prices: {}", e);
                return FetchOutcome::Unavailable;
            }
        };

        let status = response.status();
        let body = match response.json::<serde_json::Value>().await {
            Ok(body) => body,
            Err(e) => {
                tracing::error!("Error reading price response: {}", e);
                return FetchOutcome::Unavailable;
            }
        };

        // The upstream signals throttling either via HTTP 429 or an `error`
        // field in an otherwise-200 body.
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let message = upstream_error_message(&body)
                .unwrap_or_else(|| "rate limited by price API".to_string());
            tracing::warn!("Price API rate limit: {}", message);
            return FetchOutcome::RateLimited(message);
        }
        if let Some(message) = upstream_error_message(&body) {
            tracing::warn!("Price API rate limit: {}", message);
            return FetchOutcome::RateLimited(message);
        }
        if !status.is_success() {
            tracing::error!("Price API returned {}: {}", status, body);
            return FetchOutcome::Unavailable;
        }

        match serde_json::from_value::<PriceSnapshot>(body) {
            Ok(snapshot) => FetchOutcome::Prices(snapshot),
            Err(e) => {
                tracing::error!("Unexpected price payload: {}", e);
                FetchOutcome::Unavailable
            }
        }
    }
}

impl Default for PriceSource {
    fn default() -> Self {
        Self::new()
    }
}

fn upstream_error_message(body: &serde_json::Value) -> Option<String> {
    let error = body.get("error")?;
    match error {
        serde_json::Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

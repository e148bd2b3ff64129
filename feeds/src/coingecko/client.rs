//! Blocking CoinGecko client.

use std::time::Duration;

use log::debug;
use reqwest::blocking::Client;
use reqwest::header::ACCEPT;

use super::types;
use crate::RateProvider;
use crate::error::FeedError;
use crate::types::ExchangeRate;

pub const DEFAULT_BASE_URL: &str = "https://api.coingecko.com/api/v3";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Exchange-rate quotes from CoinGecko's public API.
pub struct CoinGeckoClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl CoinGeckoClient {
    /// Create a client with a per-request `timeout`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, FeedError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FeedError::Transport(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: None,
        })
    }

    /// Attach a demo API key (sent as `x_cg_demo_api_key`).
    pub fn with_api_key(mut self, key: &str) -> Self {
        if !key.is_empty() {
            self.api_key = Some(key.to_string());
        }
        self
    }
}

impl RateProvider for CoinGeckoClient {
    fn rate(&self, base_asset: &str, quote_currency: &str) -> Result<ExchangeRate, FeedError> {
        let base = base_asset.to_lowercase();
        let quote = quote_currency.to_lowercase();
        let unavailable = |reason: String| FeedError::RateUnavailable {
            base: base.clone(),
            quote: quote.clone(),
            reason,
        };

        let url = format!("{}/simple/price", self.base_url);
        debug!("GET {url} ids={base} vs_currencies={quote}");

        let mut req = self
            .client
            .get(&url)
            .query(&[("ids", base.as_str()), ("vs_currencies", quote.as_str())])
            .header(ACCEPT, "application/json");
        if let Some(key) = &self.api_key {
            req = req.query(&[("x_cg_demo_api_key", key.as_str())]);
        }

        let resp = req
            .send()
            .map_err(|e| unavailable(format!("request failed: {}", e.without_url())))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            return Err(unavailable(format!("HTTP {status}: {body}")));
        }

        let body = resp
            .text()
            .map_err(|e| unavailable(format!("failed to read response: {}", e.without_url())))?;
        let rate = types::extract_rate(&body, &base, &quote).map_err(unavailable)?;

        Ok(ExchangeRate {
            base_asset: base.clone(),
            quote_currency: quote.clone(),
            rate,
        })
    }
}

//! Blocking blockchain.info client.

use std::time::Duration;

use log::debug;
use reqwest::blocking::Client;
use reqwest::header::ACCEPT;

use super::types;
use crate::BalanceLookup;
use crate::error::FeedError;
use crate::types::BatchBalances;

pub const DEFAULT_BASE_URL: &str = "https://blockchain.info";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Balance lookups against blockchain.info (or a compatible mirror).
pub struct BlockchainInfoClient {
    client: Client,
    base_url: String,
}

impl BlockchainInfoClient {
    /// Create a client with a per-request `timeout`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, FeedError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FeedError::Transport(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

impl BalanceLookup for BlockchainInfoClient {
    fn lookup(&self, batch: &[String]) -> Result<BatchBalances, FeedError> {
        let url = format!("{}/balance", self.base_url);
        let active = batch.join("|");

        debug!("GET {url} ({} addresses)", batch.len());

        let resp = self
            .client
            .get(&url)
            .query(&[("active", active.as_str())])
            .header(ACCEPT, "application/json")
            .send()
            .map_err(|e| FeedError::Transport(format!("balance request failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            return Err(FeedError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = resp
            .text()
            .map_err(|e| FeedError::Transport(format!("failed to read balance response: {e}")))?;
        types::parse_balance_response(&body)
    }
}

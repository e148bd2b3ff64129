//! Blocking Myfxbook HTTP client.

use std::time::Duration;

use log::debug;
use reqwest::blocking::Client;

use super::types::{parse_accounts, parse_login};
use crate::BrokerageApi;
use crate::error::BrokerError;
use crate::types::BrokerageAccount;

pub const DEFAULT_BASE_URL: &str = "https://www.myfxbook.com/api";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Blocking Myfxbook API client.
pub struct MyfxbookClient {
    client: Client,
    base_url: String,
}

impl MyfxbookClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, BrokerError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BrokerError::Transport(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// GET `{base}/{method}.json` and return the body. A failed call still
    /// answers 200, so only transport problems are caught here. The query
    /// carries the password or session, so errors are stripped of the URL.
    fn call(&self, method: &str, query: &[(&str, &str)]) -> Result<String, BrokerError> {
        let url = format!("{}/{method}.json", self.base_url);
        debug!("Myfxbook call: {method}");

        let resp = self
            .client
            .get(&url)
            .query(query)
            .send()
            .map_err(|e| {
                BrokerError::Transport(format!("{method} request failed: {}", e.without_url()))
            })?;

        let status = resp.status();
        let body = resp
            .text()
            .map_err(|e| {
                BrokerError::Transport(format!("{method} body unreadable: {}", e.without_url()))
            })?;

        if !status.is_success() {
            return Err(BrokerError::Transport(format!(
                "{method} returned {status}: {body}"
            )));
        }
        Ok(body)
    }
}

impl BrokerageApi for MyfxbookClient {
    fn login(&self, email: &str, password: &str) -> Result<String, BrokerError> {
        let body = self.call("login", &[("email", email), ("password", password)])?;
        parse_login(&body)
    }

    fn get_accounts(&self, token: &str) -> Result<Vec<BrokerageAccount>, BrokerError> {
        let body = self.call("get-my-accounts", &[("session", token)])?;
        parse_accounts(&body)
    }
}

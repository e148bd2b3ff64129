//! Ratio alerts.
//!
//! When the wallet holds less than `threshold` times the brokerage value, a
//! push notification goes out through an [`AlertSink`]. The stock sink posts
//! to an ntfy server. Delivery failures are logged and never abort a run.

use std::sync::Mutex;
use std::time::Duration;

use log::{info, warn};
use reqwest::blocking::Client;
use serde::Serialize;

use crate::error::{Error, Result};

pub const ALERT_TITLE: &str = "Portfolio Ratio Alert!";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Wallet-to-brokerage ratio found below the threshold.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatioBreach {
    pub ratio: f64,
    pub wallet_value: f64,
    pub brokerage_value: f64,
    pub threshold: f64,
}

impl RatioBreach {
    pub fn message(&self) -> String {
        format!(
            "Wallet:brokerage ratio is {:.2}:1 ({:.2} : {:.2}), below the threshold of {:.1}:1.",
            self.ratio, self.wallet_value, self.brokerage_value, self.threshold
        )
    }
}

/// Result of an alert check that found a breach.
#[derive(Debug, Clone, Serialize)]
pub struct AlertOutcome {
    pub breach: RatioBreach,
    pub delivered: bool,
}

/// Compare `wallet / brokerage` against `threshold`.
///
/// Only a positive brokerage value and a non-negative wallet value are
/// checked; anything else yields `None`.
pub fn check_ratio(wallet_value: f64, brokerage_value: f64, threshold: f64) -> Option<RatioBreach> {
    let comparable = brokerage_value > 0.0 && wallet_value >= 0.0 && wallet_value.is_finite();
    if !comparable {
        return None;
    }
    let ratio = wallet_value / brokerage_value;
    (ratio < threshold).then_some(RatioBreach {
        ratio,
        wallet_value,
        brokerage_value,
        threshold,
    })
}

/// Where alerts go.
pub trait AlertSink {
    fn send(&self, title: &str, message: &str) -> Result<()>;
}

/// Check the ratio and, on a breach, send one alert through `sink`.
pub fn notify_if_breached(
    sink: &dyn AlertSink,
    wallet_value: f64,
    brokerage_value: f64,
    threshold: f64,
) -> Option<AlertOutcome> {
    let breach = check_ratio(wallet_value, brokerage_value, threshold)?;
    let delivered = match sink.send(ALERT_TITLE, &breach.message()) {
        Ok(()) => {
            info!("Ratio alert sent: {:.2} < {:.1}", breach.ratio, breach.threshold);
            true
        }
        Err(e) => {
            warn!("Ratio alert not delivered: {e}");
            false
        }
    };
    Some(AlertOutcome { breach, delivered })
}

/// ntfy publisher: `POST {server}/{topic}` with the message as body.
pub struct NtfyClient {
    client: Client,
    url: String,
}

impl NtfyClient {
    pub fn new(server: &str, topic: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Alert(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            url: format!("{}/{}", server.trim_end_matches('/'), topic.trim()),
        })
    }
}

impl AlertSink for NtfyClient {
    fn send(&self, title: &str, message: &str) -> Result<()> {
        let resp = self
            .client
            .post(&self.url)
            .header("Title", title)
            .header("Priority", "high")
            .header("Tags", "warning")
            .body(message.to_string())
            .send()
            .map_err(|e| Error::Alert(format!("request failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().unwrap_or_default();
            return Err(Error::Alert(format!("ntfy returned {status}: {body}")));
        }
        Ok(())
    }
}

/// Sink that records alerts in memory, for tests and dry runs.
#[derive(Default)]
pub struct RecordingSink {
    sent: Mutex<Vec<(String, String)>>,
    fail: bool,
}

impl RecordingSink {
    /// A sink whose every delivery fails.
    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    /// `(title, message)` of every alert accepted so far.
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

impl AlertSink for RecordingSink {
    fn send(&self, title: &str, message: &str) -> Result<()> {
        if self.fail {
            return Err(Error::Alert("sink unavailable".into()));
        }
        if let Ok(mut sent) = self.sent.lock() {
            sent.push((title.to_string(), message.to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn below_threshold_breaches() {
        let b = check_ratio(100.0, 100.0, 1.5).unwrap();
        assert_eq!(b.ratio, 1.0);
        assert_eq!(
            b.message(),
            "Wallet:brokerage ratio is 1.00:1 (100.00 : 100.00), below the threshold of 1.5:1."
        );
    }

    #[test]
    fn at_or_above_threshold_is_quiet() {
        assert!(check_ratio(150.0, 100.0, 1.5).is_none());
        assert!(check_ratio(300.0, 100.0, 1.5).is_none());
    }

    #[test]
    fn empty_brokerage_never_alerts() {
        assert!(check_ratio(0.0, 0.0, 1.5).is_none());
        assert!(check_ratio(100.0, -5.0, 1.5).is_none());
    }

    #[test]
    fn empty_wallet_alerts() {
        assert!(check_ratio(0.0, 100.0, 1.5).is_some());
    }

    #[test]
    fn notify_sends_once() {
        let sink = RecordingSink::default();
        let outcome = notify_if_breached(&sink, 50.0, 100.0, 2.0).unwrap();
        assert!(outcome.delivered);
        let sent = sink.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, ALERT_TITLE);
    }

    #[test]
    fn failed_delivery_is_reported_not_raised() {
        let sink = RecordingSink::failing();
        let outcome = notify_if_breached(&sink, 50.0, 100.0, 2.0).unwrap();
        assert!(!outcome.delivered);
    }

    #[test]
    fn ntfy_url_joins_server_and_topic() {
        let client = NtfyClient::new("https://ntfy.sh/", "my-topic", DEFAULT_TIMEOUT).unwrap();
        assert_eq!(client.url, "https://ntfy.sh/my-topic");
    }
}

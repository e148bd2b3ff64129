//! TOML configuration loading and validation.
//!
//! Secrets (xpub, email, password, session) may be left at template values
//! such as `YOUR_ZPUB_KEY_HERE`; those count as missing. Missing secrets are
//! not a load error: the command that needs one reports
//! [`Error::ConfigurationMissing`].

use std::path::{Path, PathBuf};
use std::time::Duration;

use ratiobook::TargetRatio;
use ratiobook_broker::Credentials;
use serde::Deserialize;

use crate::error::{Error, Result};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub wallet: WalletConfig,
    #[serde(default)]
    pub balances: BalancesConfig,
    #[serde(default)]
    pub rates: RatesConfig,
    #[serde(default)]
    pub brokerage: BrokerageConfig,
    #[serde(default)]
    pub ratio: RatioConfig,
    pub alert: Option<AlertConfig>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WalletConfig {
    #[serde(default)]
    pub xpub: String,
    #[serde(default = "default_discovery_limit")]
    pub discovery_limit: u32,
    /// Carried for reference; derivation always scans `discovery_limit`.
    #[serde(default = "default_gap_limit")]
    pub gap_limit: u32,
}

fn default_discovery_limit() -> u32 {
    20
}
fn default_gap_limit() -> u32 {
    20
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            xpub: String::new(),
            discovery_limit: default_discovery_limit(),
            gap_limit: default_gap_limit(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BalancesConfig {
    #[serde(default = "default_balances_url")]
    pub base_url: String,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_feed_timeout")]
    pub timeout_secs: u64,
}

fn default_balances_url() -> String {
    "https://blockchain.info".into()
}
fn default_batch_size() -> usize {
    150
}
fn default_feed_timeout() -> u64 {
    10
}

impl Default for BalancesConfig {
    fn default() -> Self {
        Self {
            base_url: default_balances_url(),
            batch_size: default_batch_size(),
            timeout_secs: default_feed_timeout(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RatesConfig {
    #[serde(default = "default_rates_url")]
    pub base_url: String,
    /// Currency both assets are priced in.
    #[serde(default = "default_reference_currency")]
    pub reference_currency: String,
    /// Provider id of the wallet asset.
    #[serde(default = "default_asset_id")]
    pub asset_id: String,
    /// Provider id of the asset wallet value is expressed in.
    #[serde(default = "default_quote_asset_id")]
    pub quote_asset_id: String,
    pub api_key: Option<String>,
    #[serde(default = "default_feed_timeout")]
    pub timeout_secs: u64,
}

fn default_rates_url() -> String {
    "https://api.coingecko.com/api/v3".into()
}
fn default_reference_currency() -> String {
    "usd".into()
}
fn default_asset_id() -> String {
    "bitcoin".into()
}
fn default_quote_asset_id() -> String {
    "tether".into()
}

impl Default for RatesConfig {
    fn default() -> Self {
        Self {
            base_url: default_rates_url(),
            reference_currency: default_reference_currency(),
            asset_id: default_asset_id(),
            quote_asset_id: default_quote_asset_id(),
            api_key: None,
            timeout_secs: default_feed_timeout(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BrokerageConfig {
    #[serde(default = "default_brokerage_url")]
    pub base_url: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub account_name: String,
    /// Session token saved from an earlier login.
    pub session: Option<String>,
    #[serde(default = "default_brokerage_timeout")]
    pub timeout_secs: u64,
}

fn default_brokerage_url() -> String {
    "https://www.myfxbook.com/api".into()
}
fn default_brokerage_timeout() -> u64 {
    30
}

impl Default for BrokerageConfig {
    fn default() -> Self {
        Self {
            base_url: default_brokerage_url(),
            email: String::new(),
            password: String::new(),
            account_name: String::new(),
            session: None,
            timeout_secs: default_brokerage_timeout(),
        }
    }
}

/// Default target ratio, wallet : brokerage.
#[derive(Debug, Clone, Deserialize)]
pub struct RatioConfig {
    #[serde(default = "default_ratio_wallet")]
    pub wallet: f64,
    #[serde(default = "default_ratio_brokerage")]
    pub brokerage: f64,
}

fn default_ratio_wallet() -> f64 {
    2.0
}
fn default_ratio_brokerage() -> f64 {
    1.0
}

impl Default for RatioConfig {
    fn default() -> Self {
        Self {
            wallet: default_ratio_wallet(),
            brokerage: default_ratio_brokerage(),
        }
    }
}

/// Push notification when wallet : brokerage drops below `threshold : 1`.
#[derive(Debug, Clone, Deserialize)]
pub struct AlertConfig {
    #[serde(default = "default_alert_server")]
    pub server: String,
    #[serde(default)]
    pub topic: String,
    pub threshold: f64,
}

fn default_alert_server() -> String {
    "https://ntfy.sh".into()
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_dir")]
    pub dir: String,
    #[serde(default = "default_audit_file")]
    pub audit_file: String,
}

fn default_log_dir() -> String {
    "./logs".into()
}
fn default_audit_file() -> String {
    "audit.jsonl".into()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            dir: default_log_dir(),
            audit_file: default_audit_file(),
        }
    }
}

/// `Some(value)` unless `value` is blank or a `YOUR_...` template value.
pub fn configured(value: &str) -> Option<&str> {
    let value = value.trim();
    (!value.is_empty() && !value.starts_with("YOUR_")).then_some(value)
}

impl Config {
    /// Load config from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| Error::ConfigRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&contents)
    }

    /// Parse and validate TOML text.
    pub fn parse(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate config invariants.
    fn validate(&self) -> Result<()> {
        if self.wallet.discovery_limit == 0 {
            return Err(Error::Config("discovery_limit must be > 0".into()));
        }
        if self.balances.batch_size == 0 {
            return Err(Error::Config("batch_size must be > 0".into()));
        }
        if self.balances.timeout_secs == 0
            || self.rates.timeout_secs == 0
            || self.brokerage.timeout_secs == 0
        {
            return Err(Error::Config("timeouts must be > 0".into()));
        }
        if TargetRatio::new(self.ratio.wallet, self.ratio.brokerage).is_none() {
            return Err(Error::Config(
                "ratio parts must be positive numbers".into(),
            ));
        }
        if let Some(alert) = &self.alert {
            if !alert.threshold.is_finite() || alert.threshold <= 0.0 {
                return Err(Error::Config("alert threshold must be > 0".into()));
            }
        }
        Ok(())
    }

    /// The extended public key string.
    pub fn xpub(&self) -> Result<&str> {
        configured(&self.wallet.xpub).ok_or(Error::ConfigurationMissing("wallet.xpub"))
    }

    /// Brokerage account whose balance is compared with the wallet.
    pub fn account_name(&self) -> Result<&str> {
        configured(&self.brokerage.account_name)
            .ok_or(Error::ConfigurationMissing("brokerage.account_name"))
    }

    /// Login credentials, when both email and password are configured.
    pub fn credentials(&self) -> Option<Credentials> {
        let email = configured(&self.brokerage.email)?;
        let password = configured(&self.brokerage.password)?;
        Credentials::new(email, password)
    }

    /// Saved session token, unless blank or a template value.
    pub fn session_token(&self) -> Option<&str> {
        self.brokerage.session.as_deref().and_then(configured)
    }

    /// Configured default ratio. Validated on load.
    pub fn default_ratio(&self) -> TargetRatio {
        TargetRatio::new(self.ratio.wallet, self.ratio.brokerage).unwrap_or_default()
    }

    /// Alert settings, when a topic is configured.
    pub fn alert(&self) -> Option<&AlertConfig> {
        self.alert
            .as_ref()
            .filter(|a| configured(&a.topic).is_some())
    }

    pub fn balances_timeout(&self) -> Duration {
        Duration::from_secs(self.balances.timeout_secs)
    }

    pub fn rates_timeout(&self) -> Duration {
        Duration::from_secs(self.rates.timeout_secs)
    }

    pub fn brokerage_timeout(&self) -> Duration {
        Duration::from_secs(self.brokerage.timeout_secs)
    }

    /// Full path to the audit log file.
    pub fn audit_path(&self) -> PathBuf {
        Path::new(&self.logging.dir).join(&self.logging.audit_file)
    }
}

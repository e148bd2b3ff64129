//! Error types for the rebalancer.

use std::path::PathBuf;

use ratiobook::WalletError;
use ratiobook_broker::BrokerError;
use ratiobook_feeds::FeedError;

/// All errors that can occur during rebalancer operation.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A required setting is absent, empty, or still a template value.
    #[error("configuration missing: {0}")]
    ConfigurationMissing(&'static str),

    #[error("config error: {0}")]
    Config(String),

    #[error("failed to read config file {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("wallet error: {0}")]
    Wallet(#[from] WalletError),

    #[error("feed error: {0}")]
    Feed(#[from] FeedError),

    #[error("brokerage error: {0}")]
    Broker(#[from] BrokerError),

    /// A conversion rate of zero would divide by zero.
    #[error("{asset} rate is zero, cannot convert")]
    ZeroRate { asset: String },

    #[error("alert delivery failed: {0}")]
    Alert(String),

    #[error("prompt failed: {0}")]
    Prompt(String),

    #[error("audit log error: {0}")]
    Audit(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

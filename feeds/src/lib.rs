//! Balance and exchange-rate feeds for ratiobook.
//!
//! Provides two provider traits and their implementations:
//!
//! - [`BalanceLookup`]: one balance request for a batch of addresses.
//!   [`BalanceFetcher`] drives it over any number of addresses, batching and
//!   absorbing per-batch failures.
//! - [`RateProvider`]: one fresh exchange-rate quote per call.
//!
//! HTTP implementations (feature `http`):
//!
//! - **blockchain.info** balance endpoint ([`blockchain_info`])
//! - **CoinGecko** simple price endpoint ([`coingecko`])

pub mod balance;
pub mod blockchain_info;
pub mod coingecko;
pub mod error;
pub mod mock;
pub mod types;

pub use balance::{AddressBalances, BalanceFetcher, MAX_BATCH_SIZE};
pub use error::FeedError;
pub use types::*;

/// A balance provider that answers for one batch of addresses per call.
pub trait BalanceLookup {
    /// Query balances for `batch`.
    ///
    /// The map holds one entry per address the provider mentioned: `Some`
    /// with the final balance in satoshis, or `None` when the entry was
    /// present but carried no usable balance. Addresses the provider left
    /// out are simply absent.
    fn lookup(&self, batch: &[String]) -> Result<BatchBalances, FeedError>;
}

/// A price-quote provider. Every call is a fresh request; nothing is cached.
pub trait RateProvider {
    /// Price of one unit of `base_asset` in `quote_currency`.
    fn rate(&self, base_asset: &str, quote_currency: &str) -> Result<ExchangeRate, FeedError>;
}

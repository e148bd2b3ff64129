//! Wallet valuation: derive addresses, fetch balances, convert to the quote
//! asset.
//!
//! The wallet's BTC total is priced in the reference currency, then divided
//! by the quote asset's price in that same currency:
//!
//! ```text
//! value = btc * rate(asset, ccy) / rate(quote_asset, ccy)
//! ```

use log::{info, warn};
use ratiobook::wallet::{self, Chain, ExtendedPublicKey};
use ratiobook::Sats;
use ratiobook_feeds::{BalanceFetcher, BalanceLookup, ExchangeRate, RateProvider};
use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::error::{Error, Result};

/// Which rates to use for conversion.
#[derive(Debug, Clone)]
pub struct RateSettings {
    pub asset_id: String,
    pub quote_asset_id: String,
    pub reference_currency: String,
}

/// Wallet holdings and their value in the quote asset.
#[derive(Debug, Clone, Serialize)]
pub struct WalletValuation {
    pub address_count: usize,
    pub funded_addresses: usize,
    pub failed_batches: usize,
    pub anomalies: usize,
    pub sats: Sats,
    pub btc: f64,
    pub chain_totals: FxHashMap<Chain, Sats>,
    pub asset_rate: ExchangeRate,
    pub quote_rate: ExchangeRate,
    /// Wallet value expressed in the quote asset.
    pub value: f64,
}

impl WalletValuation {
    /// True if any zero may stand in for an unknown balance.
    pub fn is_partial(&self) -> bool {
        self.failed_batches > 0 || self.anomalies > 0
    }
}

/// `btc * asset_rate / quote_rate`, refusing a zero or non-finite divisor.
pub fn value_in_quote(btc: f64, asset_rate: f64, quote_rate: &ExchangeRate) -> Result<f64> {
    if quote_rate.rate == 0.0 || !quote_rate.rate.is_finite() {
        return Err(Error::ZeroRate {
            asset: quote_rate.base_asset.clone(),
        });
    }
    Ok(btc * asset_rate / quote_rate.rate)
}

/// Value the wallet behind `key`, scanning `discovery_limit` addresses per
/// chain.
///
/// Derivation and rate failures are errors; per-batch balance failures are
/// absorbed and show up in `failed_batches`.
pub fn value_wallet<L, R>(
    key: &ExtendedPublicKey,
    discovery_limit: u32,
    fetcher: &BalanceFetcher<L>,
    rates: &R,
    settings: &RateSettings,
) -> Result<WalletValuation>
where
    L: BalanceLookup,
    R: RateProvider,
{
    let derived = wallet::derive_wallet(key, discovery_limit)?;
    let addresses: Vec<String> = derived.iter().map(|d| d.address.clone()).collect();

    let balances = fetcher.fetch_balances(&addresses);
    if balances.is_partial() {
        warn!(
            "Wallet total may be low: {} failed batches, {} anomalies",
            balances.failed_batches, balances.anomalies
        );
    }

    let mut chain_totals: FxHashMap<Chain, Sats> = FxHashMap::default();
    for d in &derived {
        let sats = balances.get(&d.address).unwrap_or(Sats::ZERO);
        let total = chain_totals.entry(d.chain).or_insert(Sats::ZERO);
        *total = *total + sats;
    }

    let sats = balances.total();
    let btc = sats.to_btc();

    let asset_rate = rates.rate(&settings.asset_id, &settings.reference_currency)?;
    let quote_rate = rates.rate(&settings.quote_asset_id, &settings.reference_currency)?;
    let value = value_in_quote(btc, asset_rate.rate, &quote_rate)?;

    info!(
        "Wallet {key}: {sats} across {} addresses, worth {value:.2} {}",
        addresses.len(),
        settings.quote_asset_id
    );

    Ok(WalletValuation {
        address_count: addresses.len(),
        funded_addresses: balances.funded().count(),
        failed_batches: balances.failed_batches,
        anomalies: balances.anomalies,
        sats,
        btc,
        chain_totals,
        asset_rate,
        quote_rate,
        value,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rate(base: &str, rate: f64) -> ExchangeRate {
        ExchangeRate {
            base_asset: base.into(),
            quote_currency: "usd".into(),
            rate,
        }
    }

    #[test]
    fn converts_through_reference_currency() {
        let v = value_in_quote(0.5, 60_000.0, &rate("tether", 1.0)).unwrap();
        assert!((v - 30_000.0).abs() < 1e-9);

        let v = value_in_quote(1.0, 60_000.0, &rate("tether", 1.2)).unwrap();
        assert!((v - 50_000.0).abs() < 1e-9);
    }

    #[test]
    fn zero_quote_rate_is_error() {
        let err = value_in_quote(1.0, 60_000.0, &rate("tether", 0.0)).unwrap_err();
        assert!(matches!(err, Error::ZeroRate { ref asset } if asset == "tether"));
    }

    #[test]
    fn empty_wallet_is_worth_zero() {
        let v = value_in_quote(0.0, 60_000.0, &rate("tether", 1.0)).unwrap();
        assert_eq!(v, 0.0);
    }
}

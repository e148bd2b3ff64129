//! Shared feed types.

use rustc_hash::FxHashMap;
use serde::Serialize;

/// Raw result of one balance batch: address → final balance, if present.
pub type BatchBalances = FxHashMap<String, Option<u64>>;

/// A freshly fetched exchange rate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExchangeRate {
    pub base_asset: String,
    pub quote_currency: String,
    /// Price of one `base_asset` in `quote_currency`.
    pub rate: f64,
}

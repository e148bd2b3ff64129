//! Mock feeds for testing: scripted balances and rates without network calls.
//!
//! ```ignore
//! use ratiobook_feeds::mock::{MockBalanceLookup, MockRateProvider};
//!
//! let lookup = MockBalanceLookup::builder()
//!     .with_balance("bc1qexample", 50_000)
//!     .fail_batch(1)
//!     .build();
//!
//! let rates = MockRateProvider::builder()
//!     .with_rate("bitcoin", "usd", 65_000.0)
//!     .build();
//! ```

use std::sync::Mutex;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::error::FeedError;
use crate::types::{BatchBalances, ExchangeRate};
use crate::{BalanceLookup, RateProvider};

/// Builder for `MockBalanceLookup`.
pub struct MockBalanceLookupBuilder {
    balances: FxHashMap<String, u64>,
    malformed: FxHashSet<String>,
    failing_batches: FxHashSet<usize>,
    fail_all: bool,
}

impl MockBalanceLookupBuilder {
    /// The provider reports `sats` for `address`.
    pub fn with_balance(mut self, address: &str, sats: u64) -> Self {
        self.balances.insert(address.to_string(), sats);
        self
    }

    /// The provider mentions `address` but without a final balance.
    pub fn malformed(mut self, address: &str) -> Self {
        self.malformed.insert(address.to_string());
        self
    }

    /// The n-th call (0-based) fails with a timeout.
    pub fn fail_batch(mut self, call_index: usize) -> Self {
        self.failing_batches.insert(call_index);
        self
    }

    /// Every call fails with a timeout.
    pub fn fail_all(mut self) -> Self {
        self.fail_all = true;
        self
    }

    pub fn build(self) -> MockBalanceLookup {
        MockBalanceLookup {
            balances: self.balances,
            malformed: self.malformed,
            failing_batches: self.failing_batches,
            fail_all: self.fail_all,
            batches: Mutex::new(Vec::new()),
        }
    }
}

/// Balance provider answering from a fixed table. Unknown addresses are
/// left out of the response.
pub struct MockBalanceLookup {
    balances: FxHashMap<String, u64>,
    malformed: FxHashSet<String>,
    failing_batches: FxHashSet<usize>,
    fail_all: bool,
    batches: Mutex<Vec<Vec<String>>>,
}

impl MockBalanceLookup {
    pub fn builder() -> MockBalanceLookupBuilder {
        MockBalanceLookupBuilder {
            balances: FxHashMap::default(),
            malformed: FxHashSet::default(),
            failing_batches: FxHashSet::default(),
            fail_all: false,
        }
    }

    /// Every batch passed to `lookup`, in call order.
    pub fn recorded_batches(&self) -> Vec<Vec<String>> {
        self.batches.lock().unwrap().clone()
    }
}

impl BalanceLookup for MockBalanceLookup {
    fn lookup(&self, batch: &[String]) -> Result<BatchBalances, FeedError> {
        let call_index = {
            let mut batches = self.batches.lock().unwrap();
            batches.push(batch.to_vec());
            batches.len() - 1
        };

        if self.fail_all || self.failing_batches.contains(&call_index) {
            return Err(FeedError::Transport("operation timed out".into()));
        }

        let mut out = BatchBalances::default();
        for address in batch {
            if self.malformed.contains(address) {
                out.insert(address.clone(), None);
            } else if let Some(&sats) = self.balances.get(address) {
                out.insert(address.clone(), Some(sats));
            }
        }
        Ok(out)
    }
}

/// Builder for `MockRateProvider`.
pub struct MockRateProviderBuilder {
    rates: FxHashMap<(String, String), f64>,
    fail_all: bool,
}

impl MockRateProviderBuilder {
    pub fn with_rate(mut self, base: &str, quote: &str, rate: f64) -> Self {
        self.rates
            .insert((base.to_lowercase(), quote.to_lowercase()), rate);
        self
    }

    /// Every call fails as if the provider were down.
    pub fn fail_all(mut self) -> Self {
        self.fail_all = true;
        self
    }

    pub fn build(self) -> MockRateProvider {
        MockRateProvider {
            rates: self.rates,
            fail_all: self.fail_all,
            calls: Mutex::new(Vec::new()),
        }
    }
}

/// Rate provider answering from a fixed table.
pub struct MockRateProvider {
    rates: FxHashMap<(String, String), f64>,
    fail_all: bool,
    calls: Mutex<Vec<(String, String)>>,
}

impl MockRateProvider {
    pub fn builder() -> MockRateProviderBuilder {
        MockRateProviderBuilder {
            rates: FxHashMap::default(),
            fail_all: false,
        }
    }

    /// Every `(base, quote)` pair requested, in call order.
    pub fn recorded_calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

impl RateProvider for MockRateProvider {
    fn rate(&self, base_asset: &str, quote_currency: &str) -> Result<ExchangeRate, FeedError> {
        let base = base_asset.to_lowercase();
        let quote = quote_currency.to_lowercase();
        self.calls
            .lock()
            .unwrap()
            .push((base.clone(), quote.clone()));

        let unavailable = |reason: &str| FeedError::RateUnavailable {
            base: base.clone(),
            quote: quote.clone(),
            reason: reason.to_string(),
        };

        if self.fail_all {
            return Err(unavailable("provider unreachable"));
        }

        let rate = *self
            .rates
            .get(&(base.clone(), quote.clone()))
            .ok_or_else(|| unavailable("pair not in response"))?;

        Ok(ExchangeRate {
            base_asset: base.clone(),
            quote_currency: quote.clone(),
            rate,
        })
    }
}

//! Batched address balance fetching.
//!
//! Splits an address list into provider-sized batches, issues one lookup per
//! batch and merges the answers. A failed batch is not fatal: it is logged
//! and every address in it counts as zero, so a dashboard still gets a total
//! from the batches that did answer. Addresses the provider omitted, or
//! returned without a balance, also count as zero. The result always holds an
//! entry for every requested address.

use log::{debug, warn};
use ratiobook::Sats;
use rustc_hash::FxHashMap;

use crate::BalanceLookup;

/// Maximum addresses per provider call.
pub const MAX_BATCH_SIZE: usize = 150;

/// Balances for a set of addresses, with counters for absorbed failures.
#[derive(Debug, Clone, Default)]
pub struct AddressBalances {
    balances: FxHashMap<String, Sats>,
    /// Batches whose request failed outright (all their addresses are zero).
    pub failed_batches: usize,
    /// Addresses missing from a response or returned without a balance.
    pub anomalies: usize,
}

impl AddressBalances {
    /// Balance of one address, if it was requested.
    pub fn get(&self, address: &str) -> Option<Sats> {
        self.balances.get(address).copied()
    }

    pub fn len(&self) -> usize {
        self.balances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.balances.is_empty()
    }

    /// Sum over every address.
    pub fn total(&self) -> Sats {
        self.balances.values().copied().sum()
    }

    /// True if any zero may stand in for an unknown balance.
    pub fn is_partial(&self) -> bool {
        self.failed_batches > 0 || self.anomalies > 0
    }

    /// Iterate `(address, balance)` pairs in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Sats)> {
        self.balances.iter().map(|(a, b)| (a.as_str(), *b))
    }

    /// Addresses holding a non-zero balance.
    pub fn funded(&self) -> impl Iterator<Item = (&str, Sats)> {
        self.iter().filter(|(_, b)| b.0 > 0)
    }
}

/// Drives a [`BalanceLookup`] over any number of addresses.
pub struct BalanceFetcher<L> {
    lookup: L,
    batch_size: usize,
}

impl<L: BalanceLookup> BalanceFetcher<L> {
    /// Fetcher with the default batch size of [`MAX_BATCH_SIZE`].
    pub fn new(lookup: L) -> Self {
        Self {
            lookup,
            batch_size: MAX_BATCH_SIZE,
        }
    }

    /// Override the batch size (clamped to at least 1).
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// The underlying provider.
    pub fn lookup(&self) -> &L {
        &self.lookup
    }

    /// Fetch balances for `addresses`. Never fails; see the module docs.
    pub fn fetch_balances(&self, addresses: &[String]) -> AddressBalances {
        let mut out = AddressBalances::default();

        for (i, batch) in addresses.chunks(self.batch_size).enumerate() {
            debug!("Balance batch {}: {} addresses", i + 1, batch.len());

            let found = match self.lookup.lookup(batch) {
                Ok(found) => found,
                Err(e) => {
                    warn!(
                        "Balance lookup failed for batch {} ({}), assuming zero: {e}",
                        i + 1,
                        batch.join(",")
                    );
                    for address in batch {
                        out.balances.insert(address.clone(), Sats::ZERO);
                    }
                    out.failed_batches += 1;
                    continue;
                }
            };

            for address in batch {
                let balance = match found.get(address) {
                    Some(Some(sats)) => Sats(*sats),
                    Some(None) => {
                        warn!("Balance entry for {address} has no final balance, assuming zero");
                        out.anomalies += 1;
                        Sats::ZERO
                    }
                    None => {
                        warn!("Balance response omitted {address}, assuming zero");
                        out.anomalies += 1;
                        Sats::ZERO
                    }
                };
                out.balances.insert(address.clone(), balance);
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockBalanceLookup;

    fn addrs(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("addr{i}")).collect()
    }

    #[test]
    fn every_address_gets_an_entry() {
        let lookup = MockBalanceLookup::builder()
            .with_balance("addr0", 1_000)
            .with_balance("addr2", 2_000)
            .build();
        let fetcher = BalanceFetcher::new(lookup);

        let result = fetcher.fetch_balances(&addrs(3));
        assert_eq!(result.len(), 3);
        assert_eq!(result.get("addr0"), Some(Sats(1_000)));
        assert_eq!(result.get("addr1"), Some(Sats::ZERO));
        assert_eq!(result.total(), Sats(3_000));
        assert_eq!(result.anomalies, 1);
    }

    #[test]
    fn batches_respect_size() {
        let lookup = MockBalanceLookup::builder().build();
        let fetcher = BalanceFetcher::new(lookup).with_batch_size(2);

        fetcher.fetch_balances(&addrs(5));
        let batches = fetcher.lookup().recorded_batches();
        assert_eq!(batches.len(), 3);
        assert_eq!(batches[0], vec!["addr0", "addr1"]);
        assert_eq!(batches[2], vec!["addr4"]);
    }

    #[test]
    fn zero_batch_size_is_clamped() {
        let fetcher = BalanceFetcher::new(MockBalanceLookup::builder().build()).with_batch_size(0);
        assert_eq!(fetcher.batch_size(), 1);
    }

    #[test]
    fn empty_input_makes_no_calls() {
        let fetcher = BalanceFetcher::new(MockBalanceLookup::builder().build());
        let result = fetcher.fetch_balances(&[]);
        assert!(result.is_empty());
        assert!(fetcher.lookup().recorded_batches().is_empty());
    }

    #[test]
    fn funded_filters_zero() {
        let lookup = MockBalanceLookup::builder()
            .with_balance("addr1", 42)
            .build();
        let result = BalanceFetcher::new(lookup).fetch_balances(&addrs(3));
        let funded: Vec<_> = result.funded().collect();
        assert_eq!(funded, vec![("addr1", Sats(42))]);
    }
}

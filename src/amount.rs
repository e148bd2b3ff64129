//! Satoshi amounts.

use std::fmt;
use std::iter::Sum;
use std::ops::Add;

/// Satoshis per bitcoin.
pub const SATS_PER_BTC: u64 = 100_000_000;

/// Bitcoin amount in satoshis (the provider's minor unit).
///
/// `Sats(150_000_000)` represents 1.5 BTC. Balances are summed as integers and
/// only converted to a float at the valuation step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Sats(pub u64);

impl Sats {
    pub const ZERO: Sats = Sats(0);

    /// Amount in whole bitcoin.
    pub fn to_btc(self) -> f64 {
        self.0 as f64 / SATS_PER_BTC as f64
    }
}

impl Add for Sats {
    type Output = Sats;

    fn add(self, rhs: Sats) -> Sats {
        Sats(self.0.saturating_add(rhs.0))
    }
}

impl Sum for Sats {
    fn sum<I: Iterator<Item = Sats>>(iter: I) -> Sats {
        iter.fold(Sats::ZERO, Add::add)
    }
}

impl fmt::Display for Sats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / SATS_PER_BTC;
        let frac = self.0 % SATS_PER_BTC;
        write!(f, "{whole}.{frac:08} BTC")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sats_display() {
        assert_eq!(format!("{}", Sats(150_000_000)), "1.50000000 BTC");
        assert_eq!(format!("{}", Sats(1)), "0.00000001 BTC");
        assert_eq!(format!("{}", Sats::ZERO), "0.00000000 BTC");
    }

    #[test]
    fn to_btc() {
        assert_eq!(Sats(SATS_PER_BTC).to_btc(), 1.0);
        assert_eq!(Sats(50_000_000).to_btc(), 0.5);
    }

    #[test]
    fn sum_saturates() {
        let total: Sats = [Sats(u64::MAX), Sats(1)].into_iter().sum();
        assert_eq!(total, Sats(u64::MAX));
        let total: Sats = [Sats(1), Sats(2), Sats(3)].into_iter().sum();
        assert_eq!(total, Sats(6));
    }
}

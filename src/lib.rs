//! # ratiobook
//!
//! Watch-only Bitcoin wallet derivation and two-asset rebalance math.
//!
//! This crate is the pure core of the ratiobook workspace: no network, no
//! files. Balance lookups, exchange rates and the brokerage session live in
//! `ratiobook-feeds` and `ratiobook-broker`; the CLI lives in
//! `ratiobook-rebalancer`.
//!
//! ## Address Derivation
//!
//! ```
//! use ratiobook::wallet::{self, Chain, ExtendedPublicKey};
//!
//! let key: ExtendedPublicKey = "zpub6rFR7y4Q2AijBEqTUquhVz398htDFrtymD9xYYfG1m4wAcvPhXNfE3EfH1r1ADqtfSdVCToUG868RvUUkgDKf31mGDtKsAYz2oz2AGutZYs"
//!     .parse()
//!     .unwrap();
//!
//! // 20 receive addresses, index 0..20
//! let receive = wallet::derive(&key, 0, 20).unwrap();
//! assert_eq!(receive.len(), 20);
//!
//! let change = key.derive_address(Chain::Change, 0).unwrap();
//! assert_eq!(change.address, "bc1q8c6fshw2dlwun7ekn9qwf37cu2rn755upcp6el");
//! ```
//!
//! ## Rebalancing
//!
//! ```
//! use ratiobook::{rebalance, RebalanceStatus, TargetRatio};
//!
//! // $900 in the wallet, $0 at the broker, target 2:1
//! let result = rebalance(900.0, 0.0, TargetRatio::DEFAULT);
//! assert_eq!(result.status, RebalanceStatus::EmptyB);
//! assert!((result.target_value_b - 300.0).abs() < 1e-9);
//!
//! // Nothing to allocate: reported, not panicked
//! let result = rebalance(0.0, 0.0, TargetRatio::DEFAULT);
//! assert!(!result.is_computable());
//! ```
//!
//! ## Sign Convention
//!
//! | Adjustment | Meaning |
//! |------------|---------|
//! | positive | move value **into** the asset |
//! | negative | move value **out of** the asset |
//!
//! `adjustment_a + adjustment_b == 0` for every computable result.

pub mod amount;
mod error;
pub mod rebalance;
pub mod wallet;

pub use amount::{SATS_PER_BTC, Sats};
pub use error::WalletError;
pub use rebalance::{DegenerateInput, RebalanceResult, RebalanceStatus, TargetRatio, rebalance};
pub use wallet::{AddressKind, Chain, DerivedAddress, ExtendedPublicKey};

//! CoinGecko simple-price endpoint.
//!
//! `GET /simple/price?ids=<asset>&vs_currencies=<currency>` answers with a
//! nested object `{ "<asset>": { "<currency>": <rate> } }`.

#[cfg(feature = "http")]
pub mod client;
pub mod types;

#[cfg(feature = "http")]
pub use client::CoinGeckoClient;

//! blockchain.info multi-address balance endpoint.
//!
//! `GET /balance?active=addr1|addr2|...` answers with an object keyed by
//! address, each holding `final_balance` in satoshis.

#[cfg(feature = "http")]
pub mod client;
pub mod types;

#[cfg(feature = "http")]
pub use client::BlockchainInfoClient;

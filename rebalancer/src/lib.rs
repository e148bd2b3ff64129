//! ratiobook-rebalancer: wallet vs brokerage allocation report.
//!
//! Values a watch-only Bitcoin wallet, reads a brokerage account balance,
//! compares both against a target ratio and reports the adjustment needed
//! on each side. Optionally alerts when the wallet share runs low, and
//! keeps a JSONL audit trail of every evaluation.

pub mod alert;
pub mod audit;
pub mod commands;
pub mod config;
pub mod error;
pub mod evaluation;
pub mod valuation;

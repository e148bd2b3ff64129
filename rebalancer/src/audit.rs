//! JSONL audit trail logging.
//!
//! Each evaluation appends events to an audit.jsonl file, one JSON object
//! per line. Session tokens are never written; only the fact that one was
//! renewed.

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

use chrono::{DateTime, Utc};
use ratiobook::{RebalanceResult, TargetRatio};
use serde::Serialize;

use crate::alert::AlertOutcome;
use crate::error::Result;
use crate::valuation::WalletValuation;

#[derive(Serialize)]
struct Entry<'a> {
    event: &'static str,
    ts: DateTime<Utc>,
    #[serde(flatten)]
    data: &'a serde_json::Value,
}

/// Append-only JSONL writer, flushed after every event.
pub struct AuditLog {
    writer: BufWriter<File>,
}

impl AuditLog {
    /// Open the trail for appending, creating missing parent directories.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            writer: BufWriter::new(file),
        })
    }

    fn record(&mut self, event: &'static str, data: serde_json::Value) -> Result<()> {
        let entry = Entry {
            event,
            ts: Utc::now(),
            data: &data,
        };
        serde_json::to_writer(&mut self.writer, &entry).map_err(std::io::Error::from)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }
}

pub fn log_evaluation_started(
    audit: &mut AuditLog,
    ratio: TargetRatio,
    account: Option<&str>,
) -> Result<()> {
    audit.record(
        "evaluation_started",
        serde_json::json!({
            "ratio_wallet": ratio.a(),
            "ratio_brokerage": ratio.b(),
            "account": account,
        }),
    )
}

pub fn log_wallet_valued(audit: &mut AuditLog, valuation: &WalletValuation) -> Result<()> {
    audit.record(
        "wallet_valued",
        serde_json::json!({
            "addresses": valuation.address_count,
            "sats": valuation.sats.0,
            "asset_rate": valuation.asset_rate.rate,
            "quote_rate": valuation.quote_rate.rate,
            "value": valuation.value,
            "failed_batches": valuation.failed_batches,
            "anomalies": valuation.anomalies,
        }),
    )
}

pub fn log_brokerage_fetched(audit: &mut AuditLog, account: &str, balance: f64) -> Result<()> {
    audit.record(
        "brokerage_fetched",
        serde_json::json!({
            "account": account,
            "balance": balance,
        }),
    )
}

pub fn log_session_renewed(audit: &mut AuditLog) -> Result<()> {
    audit.record("session_renewed", serde_json::json!({}))
}

pub fn log_rebalance_computed(audit: &mut AuditLog, result: &RebalanceResult) -> Result<()> {
    audit.record(
        "rebalance_computed",
        serde_json::json!({
            "status": format!("{:?}", result.status),
            "total": result.total_value,
            "target_wallet": result.target_value_a,
            "target_brokerage": result.target_value_b,
            "adjust_wallet": result.adjustment_a,
            "adjust_brokerage": result.adjustment_b,
        }),
    )
}

pub fn log_alert_sent(audit: &mut AuditLog, outcome: &AlertOutcome) -> Result<()> {
    audit.record(
        "alert_sent",
        serde_json::json!({
            "ratio": outcome.breach.ratio,
            "threshold": outcome.breach.threshold,
            "delivered": outcome.delivered,
        }),
    )
}

/// One side of an evaluation failed (`side` is `wallet` or `brokerage`).
pub fn log_evaluation_failed(audit: &mut AuditLog, side: &str, error: &str) -> Result<()> {
    audit.record(
        "evaluation_failed",
        serde_json::json!({
            "side": side,
            "error": error,
        }),
    )
}

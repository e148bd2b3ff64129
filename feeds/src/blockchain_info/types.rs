//! blockchain.info response parsing.

use rustc_hash::FxHashMap;
use serde_json::Value;

use crate::error::FeedError;
use crate::types::BatchBalances;

/// Parse a `/balance` response body.
///
/// Entries that are not objects or lack an integer `final_balance` map to
/// `None`; the caller decides how to treat them.
pub fn parse_balance_response(body: &str) -> Result<BatchBalances, FeedError> {
    let raw: FxHashMap<String, Value> = serde_json::from_str(body)
        .map_err(|e| FeedError::Decode(format!("failed to parse balance response: {e}")))?;

    Ok(raw
        .into_iter()
        .map(|(address, entry)| {
            let balance = entry.get("final_balance").and_then(Value::as_u64);
            (address, balance)
        })
        .collect())
}

//! CoinGecko response parsing.

use serde_json::Value;

/// Pull `body[asset][currency]` out of a simple-price response.
///
/// Returns the reason as a string on failure; the client wraps it into a
/// `RateUnavailable` error that names the pair.
pub fn extract_rate(body: &str, asset: &str, currency: &str) -> Result<f64, String> {
    let parsed: Value =
        serde_json::from_str(body).map_err(|e| format!("failed to decode response: {e}"))?;

    let value = parsed
        .get(asset)
        .and_then(|quotes| quotes.get(currency))
        .ok_or_else(|| format!("no {asset}/{currency} entry in response"))?;

    value
        .as_f64()
        .ok_or_else(|| format!("{asset}/{currency} rate is not a number: {value}"))
}

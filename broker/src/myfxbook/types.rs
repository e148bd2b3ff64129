//! Myfxbook response types and parsing.

use serde::Deserialize;

use crate::error::BrokerError;
use crate::types::BrokerageAccount;

/// Message the service uses for a rejected session, and for rejected
/// credentials on login.
pub const INVALID_SESSION_MESSAGE: &str = "Invalid session.";

/// Response of `login.json`.
#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub error: bool,
    #[serde(default)]
    pub message: String,
    pub session: Option<String>,
}

/// Response of `get-my-accounts.json`.
#[derive(Debug, Deserialize)]
pub struct AccountsResponse {
    #[serde(default)]
    pub error: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub accounts: Vec<AccountEntry>,
}

/// One entry of the account list. Only the fields used here are kept.
#[derive(Debug, Deserialize)]
pub struct AccountEntry {
    #[serde(default)]
    pub name: String,
    pub balance: Option<f64>,
    pub currency: Option<String>,
}

impl From<AccountEntry> for BrokerageAccount {
    fn from(entry: AccountEntry) -> Self {
        BrokerageAccount {
            name: entry.name,
            balance: entry.balance,
            currency: entry.currency,
        }
    }
}

fn is_invalid_session(message: &str) -> bool {
    message.trim().eq_ignore_ascii_case(INVALID_SESSION_MESSAGE)
}

fn or_unknown(message: String) -> String {
    if message.trim().is_empty() {
        "unknown error".to_string()
    } else {
        message
    }
}

/// Parse a login body into the session token.
pub fn parse_login(body: &str) -> Result<String, BrokerError> {
    let resp: LoginResponse = serde_json::from_str(body)
        .map_err(|e| BrokerError::Transport(format!("failed to parse login response: {e}")))?;

    if resp.error {
        if is_invalid_session(&resp.message) {
            return Err(BrokerError::Authentication(
                "login rejected: check email and password".into(),
            ));
        }
        return Err(BrokerError::Authentication(or_unknown(resp.message)));
    }

    match resp.session {
        Some(session) if !session.trim().is_empty() => Ok(session),
        _ => Err(BrokerError::Authentication(
            "login response carried no session".into(),
        )),
    }
}

/// Parse an account list body.
pub fn parse_accounts(body: &str) -> Result<Vec<BrokerageAccount>, BrokerError> {
    let resp: AccountsResponse = serde_json::from_str(body)
        .map_err(|e| BrokerError::Transport(format!("failed to parse accounts response: {e}")))?;

    if resp.error {
        if is_invalid_session(&resp.message) {
            return Err(BrokerError::InvalidSession);
        }
        return Err(BrokerError::Api(or_unknown(resp.message)));
    }

    Ok(resp.accounts.into_iter().map(BrokerageAccount::from).collect())
}

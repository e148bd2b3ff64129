//! Brokerage types: accounts, credentials and session state.

use std::fmt;

use serde::Serialize;
use zeroize::Zeroizing;

/// One account as listed by the brokerage.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BrokerageAccount {
    pub name: String,
    /// `None` when the service listed the account without a balance.
    pub balance: Option<f64>,
    pub currency: Option<String>,
}

impl BrokerageAccount {
    pub fn new(name: &str, balance: f64) -> Self {
        Self {
            name: name.to_string(),
            balance: Some(balance),
            currency: None,
        }
    }
}

/// Login credentials. The password is wiped from memory on drop and never
/// printed.
#[derive(Clone)]
pub struct Credentials {
    email: String,
    password: Zeroizing<String>,
}

impl Credentials {
    /// Returns `None` if either field is empty.
    pub fn new(email: &str, password: &str) -> Option<Self> {
        if email.trim().is_empty() || password.is_empty() {
            return None;
        }
        Some(Self {
            email: email.trim().to_string(),
            password: Zeroizing::new(password.to_string()),
        })
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Where the session stands.
#[derive(Clone, PartialEq, Eq)]
pub enum SessionState {
    /// No token yet.
    NoSession,
    /// A token believed valid.
    Active(String),
    /// The service rejected the last token; the next request logs in again.
    Invalid,
}

impl SessionState {
    pub fn token(&self) -> Option<&str> {
        match self {
            SessionState::Active(token) => Some(token),
            _ => None,
        }
    }
}

impl fmt::Debug for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::NoSession => write!(f, "NoSession"),
            SessionState::Active(token) => write!(f, "Active({})", mask_token(token)),
            SessionState::Invalid => write!(f, "Invalid"),
        }
    }
}

/// Shorten a session token for logs: first four characters, then `****`.
pub fn mask_token(token: &str) -> String {
    let head: String = token.chars().take(4).collect();
    format!("{head}****")
}

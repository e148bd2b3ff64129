//! Session lifecycle over a [`BrokerageApi`].
//!
//! ```text
//!            login ok                 InvalidSession
//! NoSession ---------> Active(token) ----------------> Invalid
//!                          ^                              |
//!                          +-------- login ok ------------+
//! ```
//!
//! A balance lookup retries at most once: if the service rejects the token,
//! the session logs in again and repeats the account listing. A second
//! rejection is returned to the caller.

use log::{debug, info, warn};

use crate::error::BrokerError;
use crate::types::{BrokerageAccount, Credentials, SessionState, mask_token};
use crate::BrokerageApi;

/// True for tokens that are empty or left at a `YOUR_...` template value.
pub fn is_placeholder_token(token: &str) -> bool {
    let token = token.trim();
    token.is_empty() || token.starts_with("YOUR_")
}

/// Stateful brokerage client.
pub struct BrokerageSession<A> {
    api: A,
    credentials: Option<Credentials>,
    state: SessionState,
    renewed: Option<String>,
}

impl<A: BrokerageApi> BrokerageSession<A> {
    /// Start a session. A usable `prior_token` makes the session `Active`
    /// without logging in; credentials are only needed once a login is.
    pub fn new(api: A, credentials: Option<Credentials>, prior_token: Option<&str>) -> Self {
        let state = match prior_token {
            Some(token) if !is_placeholder_token(token) => {
                SessionState::Active(token.trim().to_string())
            }
            _ => SessionState::NoSession,
        };
        Self {
            api,
            credentials,
            state,
            renewed: None,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Current token, if the session is active.
    pub fn token(&self) -> Option<&str> {
        self.state.token()
    }

    /// The most recent token obtained by logging in through this session.
    /// `None` if every call so far used the prior token.
    pub fn renewed_token(&self) -> Option<&str> {
        self.renewed.as_deref()
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Log in with the stored credentials and make the new token active.
    pub fn login(&mut self) -> Result<String, BrokerError> {
        let creds = self.credentials.as_ref().ok_or_else(|| {
            BrokerError::Authentication("email and password are required to log in".into())
        })?;

        debug!("Logging in to brokerage as {}", creds.email());
        let token = match self.api.login(creds.email(), creds.password()) {
            Ok(token) => token,
            Err(BrokerError::InvalidSession) => {
                return Err(BrokerError::Authentication(
                    "login rejected: check email and password".into(),
                ));
            }
            Err(BrokerError::Api(msg)) => return Err(BrokerError::Authentication(msg)),
            Err(e) => return Err(e),
        };

        if token.trim().is_empty() {
            return Err(BrokerError::Authentication(
                "login succeeded but returned no session".into(),
            ));
        }

        info!("Brokerage login ok, session {}", mask_token(&token));
        self.state = SessionState::Active(token.clone());
        self.renewed = Some(token.clone());
        Ok(token)
    }

    /// List accounts with `token`. A rejected token moves the session to
    /// `Invalid`.
    pub fn get_accounts(&mut self, token: &str) -> Result<Vec<BrokerageAccount>, BrokerError> {
        if is_placeholder_token(token) {
            self.state = SessionState::Invalid;
            return Err(BrokerError::InvalidSession);
        }

        match self.api.get_accounts(token) {
            Ok(accounts) => {
                debug!("Brokerage listed {} accounts", accounts.len());
                self.state = SessionState::Active(token.to_string());
                Ok(accounts)
            }
            Err(BrokerError::InvalidSession) => {
                warn!("Brokerage rejected session {}", mask_token(token));
                self.state = SessionState::Invalid;
                Err(BrokerError::InvalidSession)
            }
            Err(e) => Err(e),
        }
    }

    /// List accounts, logging in first if needed and once more if the
    /// token is rejected.
    pub fn accounts(&mut self) -> Result<Vec<BrokerageAccount>, BrokerError> {
        let mut retried = false;
        loop {
            let token = self.ensure_session()?;
            match self.get_accounts(&token) {
                Err(BrokerError::InvalidSession) if !retried => {
                    info!("Renewing brokerage session");
                    retried = true;
                }
                other => return other,
            }
        }
    }

    /// Balance of the account named `name`.
    pub fn fetch_account_balance(&mut self, name: &str) -> Result<f64, BrokerError> {
        let accounts = self.accounts()?;
        find_account_balance(&accounts, name)
    }

    fn ensure_session(&mut self) -> Result<String, BrokerError> {
        match &self.state {
            SessionState::Active(token) => Ok(token.clone()),
            SessionState::NoSession | SessionState::Invalid => self.login(),
        }
    }
}

/// Pick the balance of the account named exactly `name`.
pub fn find_account_balance(accounts: &[BrokerageAccount], name: &str) -> Result<f64, BrokerError> {
    let account = accounts
        .iter()
        .find(|a| a.name == name)
        .ok_or_else(|| BrokerError::AccountNotFound {
            name: name.to_string(),
            available: accounts.iter().map(|a| a.name.clone()).collect(),
        })?;

    account
        .balance
        .ok_or_else(|| BrokerError::Api(format!("account '{name}' has no balance")))
}

//! Mock brokerage for testing: scripted accounts and session behavior
//! without network calls.
//!
//! ```ignore
//! use ratiobook_broker::mock::MockBrokerage;
//!
//! let api = MockBrokerage::builder()
//!     .with_account("Main", 1_500.0)
//!     .valid_token("saved-token")
//!     .reject_first_fetches(1)
//!     .build();
//! ```

use std::sync::Mutex;

use crate::error::BrokerError;
use crate::types::BrokerageAccount;
use crate::BrokerageApi;

/// Builder for `MockBrokerage`.
pub struct MockBrokerageBuilder {
    accounts: Vec<BrokerageAccount>,
    valid_tokens: Vec<String>,
    reject_login: bool,
    reject_first_fetches: usize,
    api_error: Option<String>,
}

impl MockBrokerageBuilder {
    pub fn with_account(mut self, name: &str, balance: f64) -> Self {
        self.accounts.push(BrokerageAccount::new(name, balance));
        self
    }

    /// An account listed without a balance field.
    pub fn with_unbalanced_account(mut self, name: &str) -> Self {
        self.accounts.push(BrokerageAccount {
            name: name.to_string(),
            balance: None,
            currency: None,
        });
        self
    }

    /// A token the mock accepts before any login.
    pub fn valid_token(mut self, token: &str) -> Self {
        self.valid_tokens.push(token.to_string());
        self
    }

    /// Every login fails with the service's "Invalid session." answer.
    pub fn reject_login(mut self) -> Self {
        self.reject_login = true;
        self
    }

    /// The first `n` account listings fail with `InvalidSession`, whatever
    /// the token.
    pub fn reject_first_fetches(mut self, n: usize) -> Self {
        self.reject_first_fetches = n;
        self
    }

    /// Every account listing fails with an API error carrying `message`.
    pub fn api_error(mut self, message: &str) -> Self {
        self.api_error = Some(message.to_string());
        self
    }

    pub fn build(self) -> MockBrokerage {
        MockBrokerage {
            accounts: self.accounts,
            reject_login: self.reject_login,
            reject_first_fetches: self.reject_first_fetches,
            api_error: self.api_error,
            state: Mutex::new(MockState {
                valid_tokens: self.valid_tokens,
                logins: 0,
                fetch_tokens: Vec::new(),
            }),
        }
    }
}

struct MockState {
    valid_tokens: Vec<String>,
    logins: usize,
    fetch_tokens: Vec<String>,
}

/// Brokerage API answering from a fixed account list. Each login issues a
/// new token `mock-session-N` that is accepted from then on.
pub struct MockBrokerage {
    accounts: Vec<BrokerageAccount>,
    reject_login: bool,
    reject_first_fetches: usize,
    api_error: Option<String>,
    state: Mutex<MockState>,
}

impl MockBrokerage {
    pub fn builder() -> MockBrokerageBuilder {
        MockBrokerageBuilder {
            accounts: Vec::new(),
            valid_tokens: Vec::new(),
            reject_login: false,
            reject_first_fetches: 0,
            api_error: None,
        }
    }

    /// Number of login calls so far.
    pub fn login_calls(&self) -> usize {
        self.state.lock().unwrap().logins
    }

    /// Number of account listing calls so far.
    pub fn account_calls(&self) -> usize {
        self.state.lock().unwrap().fetch_tokens.len()
    }

    /// Token passed to each account listing, in call order.
    pub fn recorded_tokens(&self) -> Vec<String> {
        self.state.lock().unwrap().fetch_tokens.clone()
    }
}

impl BrokerageApi for MockBrokerage {
    fn login(&self, _email: &str, _password: &str) -> Result<String, BrokerError> {
        let mut state = self.state.lock().unwrap();
        state.logins += 1;

        if self.reject_login {
            return Err(BrokerError::Authentication("Invalid session.".into()));
        }

        let token = format!("mock-session-{}", state.logins);
        state.valid_tokens.push(token.clone());
        Ok(token)
    }

    fn get_accounts(&self, token: &str) -> Result<Vec<BrokerageAccount>, BrokerError> {
        let mut state = self.state.lock().unwrap();
        state.fetch_tokens.push(token.to_string());

        if state.fetch_tokens.len() <= self.reject_first_fetches {
            return Err(BrokerError::InvalidSession);
        }
        if !state.valid_tokens.iter().any(|t| t == token) {
            return Err(BrokerError::InvalidSession);
        }
        if let Some(msg) = &self.api_error {
            return Err(BrokerError::Api(msg.clone()));
        }
        Ok(self.accounts.clone())
    }
}

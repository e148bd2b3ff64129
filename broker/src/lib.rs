//! Brokerage access for ratiobook.
//!
//! The brokerage is reached through a session token obtained by logging in
//! with email and password. [`BrokerageSession`] owns the token lifecycle:
//! it logs in lazily, notices when the service rejects a token, logs in once
//! more, and surfaces any token it obtained so the caller can persist it.
//!
//! Implementations of [`BrokerageApi`]:
//!
//! - **Myfxbook** (feature `myfxbook`): the public Myfxbook JSON API
//! - [`mock::MockBrokerage`]: scripted responses for tests

pub mod error;
pub mod mock;
pub mod myfxbook;
pub mod session;
pub mod types;

pub use error::BrokerError;
pub use session::{BrokerageSession, find_account_balance, is_placeholder_token};
pub use types::*;

/// The two remote calls a session needs.
pub trait BrokerageApi {
    /// Log in and return a fresh session token.
    fn login(&self, email: &str, password: &str) -> Result<String, BrokerError>;

    /// List the accounts visible to `token`.
    ///
    /// Must return [`BrokerError::InvalidSession`] when the service rejects
    /// the token, so the session can log in again.
    fn get_accounts(&self, token: &str) -> Result<Vec<BrokerageAccount>, BrokerError>;
}

impl<T: BrokerageApi + ?Sized> BrokerageApi for &T {
    fn login(&self, email: &str, password: &str) -> Result<String, BrokerError> {
        (**self).login(email, password)
    }

    fn get_accounts(&self, token: &str) -> Result<Vec<BrokerageAccount>, BrokerError> {
        (**self).get_accounts(token)
    }
}

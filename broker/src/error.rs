//! Brokerage error types.

/// Errors that can occur while talking to the brokerage.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BrokerError {
    /// Login was rejected or could not be attempted.
    #[error("authentication error: {0}")]
    Authentication(String),

    /// The service no longer accepts the session token.
    #[error("invalid session")]
    InvalidSession,

    /// The service answered with an error flag.
    #[error("brokerage API error: {0}")]
    Api(String),

    /// Network failure, unexpected status, or an unreadable body.
    #[error("transport error: {0}")]
    Transport(String),

    /// No account carries the requested name.
    #[error("account '{name}' not found; available: {}", available_list(.available))]
    AccountNotFound { name: String, available: Vec<String> },
}

fn available_list(names: &[String]) -> String {
    if names.is_empty() {
        "none".to_string()
    } else {
        names.join(", ")
    }
}

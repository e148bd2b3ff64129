//! Feed error types.

/// Errors that can occur while querying a balance or rate provider.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    /// Network failure or timeout.
    #[error("transport error: {0}")]
    Transport(String),

    /// The provider answered with a non-success HTTP status.
    #[error("provider returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The body could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// No usable rate for the requested pair.
    #[error("rate unavailable for {base}/{quote}: {reason}")]
    RateUnavailable {
        base: String,
        quote: String,
        reason: String,
    },
}

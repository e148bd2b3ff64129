//! Wallet derivation errors.

/// Errors returned while parsing an extended public key or deriving addresses.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WalletError {
    /// Chain selector must be 0 (receive) or 1 (change).
    #[error("invalid chain selector {0}: expected 0 (receive) or 1 (change)")]
    InvalidChainSelector(u32),

    /// The key string is not valid base58check or has the wrong length.
    #[error("invalid extended public key: {0}")]
    InvalidKey(String),

    /// The 4-byte version prefix is not one of the known public versions.
    #[error("unknown extended key version {0:02x?}")]
    UnknownVersion([u8; 4]),

    /// Child key derivation failed (index out of range or invalid tweak).
    #[error("derivation failed: {0}")]
    Derivation(String),
}

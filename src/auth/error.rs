//! Token Errors
//!
//! Failure taxonomy for token issuance and verification.

use thiserror::Error;

/// Errors raised by the token codec and [`TokenService`](super::jwt::TokenService).
///
/// Every variant is terminal for the call that produced it. The verification
/// variants (`Malformed`, `Signature`, `Decode`, `Expired`) are expected,
/// client-triggerable conditions and must be collapsed into a single
/// unauthorized response at the HTTP boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("invalid token service configuration: {0}")]
    Config(String),

    #[error("token must have exactly three non-empty segments")]
    Malformed,

    #[error("token signature does not match")]
    Signature,

    #[error("token payload could not be decoded: {0}")]
    Decode(String),

    #[error("token has expired")]
    Expired,

    #[error("failed to encode token: {0}")]
    Encoding(String),
}

impl TokenError {
    /// Stable identifier for structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            TokenError::Config(_) => "config",
            TokenError::Malformed => "malformed",
            TokenError::Signature => "signature",
            TokenError::Decode(_) => "decode",
            TokenError::Expired => "expired",
            TokenError::Encoding(_) => "encoding",
        }
    }
}

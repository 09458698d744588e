//! Identity error types
//!
//! These errors stay internal to the crate for the most part: the public
//! `IdentityStore` surface absorbs storage failures and mints a replacement
//! token instead of surfacing them.

use thiserror::Error;

/// Result type alias for identity operations
pub type AuthResult<T> = Result<T, AuthError>;

/// Identity error types
#[derive(Debug, Error)]
pub enum AuthError {
    /// Token does not have the expected three-segment structure
    #[error("Token is malformed")]
    MalformedToken,

    /// Token payload could not be decoded or parsed
    #[error("Token payload is invalid: {0}")]
    InvalidPayload(String),

    /// Token has expired
    #[error("Token has expired")]
    TokenExpired,

    /// Durable store read/write failed
    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<sled::Error> for AuthError {
    fn from(err: sled::Error) -> Self {
        Self::Storage(err.to_string())
    }
}

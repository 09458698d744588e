//! Client error types
//!
//! Network-class failures never show up here - the executor absorbs them and
//! serves a synthesized payload instead. What remains is the caller's own
//! mistakes (malformed call construction) and the typed facade's API errors.

use thiserror::Error;

/// Result type alias for client operations
pub type ClientResult<T> = Result<T, ClientError>;

/// Client error types
#[derive(Debug, Error)]
pub enum ClientError {
    /// Base url must use http:// or https:// and include a host
    #[error("Invalid base url: {0}")]
    InvalidBaseUrl(String),

    /// Caller supplied a header that cannot be represented on the wire
    #[error("Invalid header `{name}`: {message}")]
    InvalidHeader { name: String, message: String },

    /// The underlying HTTP client could not be constructed
    #[error("Failed to construct HTTP client: {0}")]
    Construction(String),

    /// Typed endpoint received a non-success status
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Typed endpoint received a body it could not decode
    #[error("Malformed response payload: {0}")]
    Decode(#[from] serde_json::Error),
}

//! Error types for decoding operations.

use std::string::FromUtf8Error;

/// Result type alias for decoding operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Decoding error types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Declared transfer encoding is outside the known set.
    ///
    /// Carries the offending encoding string as the server declared it.
    #[error("Unsupported transfer encoding: {0}")]
    UnsupportedEncoding(String),

    /// Malformed encoded data.
    #[error("Invalid encoding: {0}")]
    InvalidEncoding(String),

    /// Base64 decode error.
    #[error("Base64 decode error: {0}")]
    Base64Decode(#[from] base64::DecodeError),

    /// UTF-8 decode error.
    #[error("UTF-8 decode error: {0}")]
    Utf8Decode(#[from] FromUtf8Error),

    /// Invalid header syntax.
    #[error("Invalid header: {0}")]
    InvalidHeader(String),
}

//! Call-control API error types

use thiserror::Error;

/// Errors from backend token generation.
#[derive(Error, Debug)]
pub enum TokenError {
    /// The configured private key could not be read.
    #[error("Failed to read private key from {path}: {source}")]
    KeyRead {
        path: String,
        source: std::io::Error,
    },

    /// The private key material is not a usable RSA PEM.
    #[error("Invalid application private key: {0}")]
    InvalidKey(String),

    /// JWT encoding failed.
    #[error("Failed to encode application token: {0}")]
    Encoding(String),
}

/// Errors from the call-control API client.
#[derive(Error, Debug)]
pub enum CallControlError {
    /// Token generation failed before the request was sent.
    #[error("Token generation failed: {0}")]
    Token(#[from] TokenError),

    /// Transport-level failure (connect, TLS, timeout).
    #[error("Call-control request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The vendor rejected the request with a non-2xx status.
    #[error("Call-control API returned {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },
}

//! Credential acquisition errors.

use axum::http::StatusCode;
use thiserror::Error;

use crate::upstream::UpstreamError;

/// Errors that can occur while acquiring or applying credentials.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Login request could not be delivered.
    #[error("login request failed: {0}")]
    Upstream(#[from] UpstreamError),

    /// Upstream answered the login with an unexpected status.
    #[error("login rejected with status {status}: {body}")]
    Rejected { status: StatusCode, body: String },

    /// Login succeeded but no session cookie was issued.
    #[error("login returned status {status} without a Set-Cookie header")]
    MissingCookie { status: StatusCode },

    /// The Set-Cookie header could not be parsed.
    #[error("malformed Set-Cookie header: {0}")]
    MalformedCookie(String),

    /// Credential cannot be encoded as an HTTP header.
    #[error("credential is not a valid header value")]
    InvalidHeader,
}

/// Result type for credential operations.
pub type AuthResult<T> = Result<T, AuthError>;

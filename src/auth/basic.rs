//! Static HTTP Basic credentials.

use axum::http::{header, HeaderMap, HeaderValue};
use base64::{engine::general_purpose::STANDARD, Engine};

use crate::auth::error::{AuthError, AuthResult};

/// Username/password pair, pre-encoded as an `Authorization` header.
#[derive(Clone)]
pub struct BasicCredentials {
    username: String,
    header: HeaderValue,
}

impl BasicCredentials {
    pub fn new(username: &str, password: &str) -> AuthResult<Self> {
        let encoded = STANDARD.encode(format!("{}:{}", username, password));
        let mut header =
            HeaderValue::from_str(&format!("Basic {}", encoded)).map_err(|_| AuthError::InvalidHeader)?;
        header.set_sensitive(true);
        Ok(Self {
            username: username.to_string(),
            header,
        })
    }

    /// Set `Authorization`, replacing whatever the caller sent.
    pub fn apply(&self, headers: &mut HeaderMap) {
        headers.insert(header::AUTHORIZATION, self.header.clone());
    }
}

impl std::fmt::Debug for BasicCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BasicCredentials")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

//! Cookie-login strategy.
//!
//! # Responsibilities
//! - Submit the login form and extract the session cookie
//! - Hold the current session token for concurrent readers
//! - Merge the session cookie into outbound `Cookie` headers
//!
//! # Design Decisions
//! - The token lives behind `ArcSwapOption`: readers take a full snapshot,
//!   a refresh publishes a new `Arc` in one store
//! - A failed login keeps the previous token visible

use arc_swap::ArcSwapOption;
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use std::sync::Arc;
use std::time::Duration;

use crate::auth::error::{AuthError, AuthResult};
use crate::upstream::{UpstreamClient, UpstreamError};

/// Fixed redirect target submitted with the login form.
const LOGIN_REDIRECT_TARGET: &str = "/";

/// Fixed submit marker submitted with the login form.
const LOGIN_SUBMIT: &str = "Login";

/// Login responses that may carry a session cookie.
const LOGIN_SUCCESS: [StatusCode; 3] = [StatusCode::OK, StatusCode::FOUND, StatusCode::SEE_OTHER];

/// Characters of a rejected login body kept for the error.
const REJECTED_BODY_CHARS: usize = 200;

/// An opaque session token and the cookie name it is sent under.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken {
    name: String,
    value: String,
}

impl SessionToken {
    /// Create a token, rejecting values that cannot travel in a `Cookie` header.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> AuthResult<Self> {
        let token = Self {
            name: name.into(),
            value: value.into(),
        };
        HeaderValue::from_str(&token.pair()).map_err(|_| AuthError::InvalidHeader)?;
        Ok(token)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// `name=value` as it appears in a `Cookie` header.
    pub fn pair(&self) -> String {
        format!("{}={}", self.name, self.value)
    }

    /// Short prefix of the value, safe for logs.
    pub fn preview(&self) -> String {
        let prefix: String = self.value.chars().take(10).collect();
        format!("{}...", prefix)
    }
}

impl std::fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionToken")
            .field("name", &self.name)
            .field("value", &self.preview())
            .finish()
    }
}

/// Extract the value of the first cookie in a `Set-Cookie` header:
/// the text after the first `=` and before the first `;`.
pub fn parse_set_cookie(header: &str) -> Option<&str> {
    let first = header.split(';').next()?;
    let (_, value) = first.split_once('=')?;
    Some(value.trim())
}

/// Set `token` in the `Cookie` header, keeping every other cookie the caller sent.
pub fn merge_cookie(headers: &mut HeaderMap, token: &SessionToken) {
    let mut pairs: Vec<String> = headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .filter(|pair| pair.split('=').next().map(str::trim) != Some(token.name()))
        .map(str::to_string)
        .collect();
    pairs.push(token.pair());

    let merged = HeaderValue::from_str(&pairs.join("; "))
        .or_else(|_| HeaderValue::from_str(&token.pair()));
    if let Ok(value) = merged {
        headers.insert(header::COOKIE, value);
    }
}

/// Form login against the upstream that yields a session cookie.
pub struct CookieLogin {
    client: UpstreamClient,
    login_url: String,
    username: String,
    password: String,
    cookie_name: String,
    timeout: Duration,
    session: ArcSwapOption<SessionToken>,
}

impl CookieLogin {
    pub fn new(
        client: UpstreamClient,
        login_url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
        cookie_name: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            client,
            login_url: login_url.into(),
            username: username.into(),
            password: password.into(),
            cookie_name: cookie_name.into(),
            timeout,
            session: ArcSwapOption::empty(),
        }
    }

    /// Submit the login form and publish the resulting session token.
    pub async fn login(&self) -> AuthResult<Arc<SessionToken>> {
        let form = [
            ("username", self.username.as_str()),
            ("password", self.password.as_str()),
            ("url", LOGIN_REDIRECT_TARGET),
            ("submit", LOGIN_SUBMIT),
        ];

        let response = self
            .client
            .http()
            .post(self.login_url.as_str())
            .form(&form)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| UpstreamError::from_send(&self.login_url, e))?;

        let status = response.status();
        if !LOGIN_SUCCESS.contains(&status) {
            let body = response.text().await.unwrap_or_default();
            return Err(AuthError::Rejected {
                status,
                body: body.chars().take(REJECTED_BODY_CHARS).collect(),
            });
        }

        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .ok_or(AuthError::MissingCookie { status })?
            .to_str()
            .map_err(|_| AuthError::MalformedCookie("value is not visible ASCII".into()))?;
        let value = parse_set_cookie(set_cookie)
            .ok_or_else(|| AuthError::MalformedCookie("no '=' in first cookie".into()))?;

        let token = Arc::new(SessionToken::new(self.cookie_name.as_str(), value)?);
        self.session.store(Some(token.clone()));
        Ok(token)
    }

    /// Snapshot of the current session token.
    pub fn current(&self) -> Option<Arc<SessionToken>> {
        self.session.load_full()
    }

    /// Attach the current session cookie, if any.
    pub fn apply(&self, headers: &mut HeaderMap) {
        if let Some(token) = self.current() {
            merge_cookie(headers, &token);
        }
    }
}

impl std::fmt::Debug for CookieLogin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CookieLogin")
            .field("login_url", &self.login_url)
            .field("username", &self.username)
            .field("cookie_name", &self.cookie_name)
            .field("session", &self.current())
            .finish()
    }
}

//! Credential manager: one instance per process, shared by every request.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::auth::basic::BasicCredentials;
use crate::auth::cookie::{CookieLogin, SessionToken};
use crate::auth::error::AuthResult;
use crate::config::{AuthMode, UpstreamConfig};
use crate::http::ProxyRequest;
use crate::observability::metrics;
use crate::upstream::UpstreamClient;

/// How credentials are obtained and attached. Selected once at startup.
#[derive(Debug)]
pub enum AuthStrategy {
    CookieLogin(CookieLogin),
    BasicAuth(BasicCredentials),
    NoAuth,
}

/// Owns the authentication state and knows how to (re)acquire it.
#[derive(Debug)]
pub struct CredentialManager {
    strategy: AuthStrategy,
    refreshes: AtomicU64,
}

impl CredentialManager {
    pub fn new(strategy: AuthStrategy) -> Self {
        Self {
            strategy,
            refreshes: AtomicU64::new(0),
        }
    }

    /// Select the strategy for the effective auth mode of `config`.
    pub fn from_config(config: &UpstreamConfig, client: UpstreamClient) -> AuthResult<Self> {
        let strategy = match config.effective_auth_mode() {
            AuthMode::CookieLogin => AuthStrategy::CookieLogin(CookieLogin::new(
                client,
                config.login_url(),
                config.effective_username(),
                config.effective_password(),
                config.cookie_name.as_str(),
                config.login_timeout(),
            )),
            AuthMode::BasicAuth => AuthStrategy::BasicAuth(BasicCredentials::new(
                config.effective_username(),
                config.effective_password(),
            )?),
            AuthMode::None => AuthStrategy::NoAuth,
        };
        Ok(Self::new(strategy))
    }

    pub fn mode(&self) -> AuthMode {
        match self.strategy {
            AuthStrategy::CookieLogin(_) => AuthMode::CookieLogin,
            AuthStrategy::BasicAuth(_) => AuthMode::BasicAuth,
            AuthStrategy::NoAuth => AuthMode::None,
        }
    }

    /// Initial credential setup. Only cookie login does any work.
    pub async fn acquire(&self) -> AuthResult<()> {
        self.obtain().await
    }

    /// Replace the credential after the upstream rejected it.
    ///
    /// Concurrent callers may each log in; the last stored session wins and
    /// readers keep seeing the previous one until then.
    pub async fn refresh(&self) -> AuthResult<()> {
        self.refreshes.fetch_add(1, Ordering::Relaxed);
        let result = self.obtain().await;
        metrics::record_auth_refresh(result.is_ok());
        result
    }

    async fn obtain(&self) -> AuthResult<()> {
        if let AuthStrategy::CookieLogin(login) = &self.strategy {
            let token = login.login().await?;
            tracing::info!(
                cookie = token.name(),
                token = %token.preview(),
                "Stored new session cookie"
            );
        }
        Ok(())
    }

    /// Attach the current credential to an outbound request.
    pub fn apply(&self, request: &mut ProxyRequest) {
        match &self.strategy {
            AuthStrategy::CookieLogin(login) => login.apply(&mut request.headers),
            AuthStrategy::BasicAuth(credentials) => credentials.apply(&mut request.headers),
            AuthStrategy::NoAuth => {}
        }
    }

    /// Current session token (cookie login only).
    pub fn session(&self) -> Option<Arc<SessionToken>> {
        match &self.strategy {
            AuthStrategy::CookieLogin(login) => login.current(),
            _ => None,
        }
    }

    /// Whether `apply` would attach anything right now.
    pub fn has_credential(&self) -> bool {
        match &self.strategy {
            AuthStrategy::CookieLogin(login) => login.current().is_some(),
            AuthStrategy::BasicAuth(_) => true,
            AuthStrategy::NoAuth => false,
        }
    }

    /// Number of refreshes requested since startup.
    pub fn refresh_count(&self) -> u64 {
        self.refreshes.load(Ordering::Relaxed)
    }
}

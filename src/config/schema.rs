//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration for the proxy.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProxyConfig {
    /// Name reported by the health endpoint.
    pub service_name: String,

    /// Listener configuration (bind address, inbound limits).
    pub listener: ListenerConfig,

    /// Upstream API and how to authenticate against it.
    pub upstream: UpstreamConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            service_name: "auth-proxy".to_string(),
            listener: ListenerConfig::default(),
            upstream: UpstreamConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind host (e.g., "0.0.0.0").
    pub host: String,

    /// Bind port.
    pub port: u16,

    /// Maximum inbound request body size in bytes.
    pub max_body_size: usize,

    /// Deadline for handling one inbound request, login and retry included.
    pub request_timeout_secs: u64,
}

impl ListenerConfig {
    /// `host:port` string suitable for binding.
    pub fn bind_address(&self) -> String {
        if self.host.contains(':') && !self.host.starts_with('[') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            max_body_size: 10 * 1024 * 1024,
            request_timeout_secs: 90,
        }
    }
}

/// How the proxy authenticates against the upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum AuthMode {
    /// Form login that yields a session cookie.
    CookieLogin,
    /// Static HTTP Basic credentials.
    BasicAuth,
    /// Forward requests without credentials.
    None,
}

impl std::fmt::Display for AuthMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthMode::CookieLogin => write!(f, "cookie-login"),
            AuthMode::BasicAuth => write!(f, "basic-auth"),
            AuthMode::None => write!(f, "none"),
        }
    }
}

/// Upstream API configuration. Immutable once loaded.
#[derive(Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Base URL of the upstream API, without trailing slash.
    pub base_url: String,

    /// Path of the login form, relative to `base_url`.
    pub login_path: String,

    /// Explicit auth mode. Inferred from the credentials when unset.
    pub auth_mode: Option<AuthMode>,

    /// Login identity.
    pub username: Option<String>,

    /// Login secret.
    pub password: Option<String>,

    /// Cookie name the session token is sent under.
    pub cookie_name: String,

    /// User-Agent sent when the caller does not provide one.
    pub user_agent: String,

    /// Timeout for forwarded requests in seconds.
    pub request_timeout_secs: u64,

    /// Timeout for login requests in seconds.
    pub login_timeout_secs: u64,

    /// Connection establishment timeout in seconds.
    pub connect_timeout_secs: u64,
}

/// Username used by the cookie login when none is configured.
pub const DEFAULT_LOGIN_USERNAME: &str = "installer";

impl UpstreamConfig {
    /// The auth mode in effect: the explicit one, or inferred from credentials.
    pub fn effective_auth_mode(&self) -> AuthMode {
        if let Some(mode) = self.auth_mode {
            return mode;
        }
        if non_empty(self.password.as_deref()).is_some() {
            AuthMode::CookieLogin
        } else {
            AuthMode::None
        }
    }

    /// Username for the effective auth mode.
    pub fn effective_username(&self) -> &str {
        match (non_empty(self.username.as_deref()), self.effective_auth_mode()) {
            (Some(username), _) => username,
            (None, AuthMode::CookieLogin) => DEFAULT_LOGIN_USERNAME,
            (None, _) => "",
        }
    }

    /// Configured password, empty when unset.
    pub fn effective_password(&self) -> &str {
        self.password.as_deref().unwrap_or_default()
    }

    /// Full login URL.
    pub fn login_url(&self) -> String {
        format!("{}{}", self.base_url, self.login_path)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn login_timeout(&self) -> Duration {
        Duration::from_secs(self.login_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Strip trailing slashes from the base URL.
    pub fn normalize(&mut self) {
        let trimmed = self.base_url.trim().trim_end_matches('/').to_string();
        self.base_url = trimmed;
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8081".to_string(),
            login_path: "/auth/login".to_string(),
            auth_mode: None,
            username: None,
            password: None,
            cookie_name: "kiwisessionid".to_string(),
            user_agent: concat!("auth-proxy/", env!("CARGO_PKG_VERSION")).to_string(),
            request_timeout_secs: 30,
            login_timeout_secs: 10,
            connect_timeout_secs: 5,
        }
    }
}

impl std::fmt::Debug for UpstreamConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpstreamConfig")
            .field("base_url", &self.base_url)
            .field("login_path", &self.login_path)
            .field("auth_mode", &self.auth_mode)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("cookie_name", &self.cookie_name)
            .field("user_agent", &self.user_agent)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("login_timeout_secs", &self.login_timeout_secs)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .finish()
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, body limit > 0)
//! - Check the upstream base URL is an absolute http(s) URL
//! - Report missing credentials as warnings, never as errors
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<Vec<ConfigWarning>, Vec<ValidationError>>
//! - Runs before config is accepted into the system

use thiserror::Error;
use url::Url;

use crate::config::schema::{AuthMode, ProxyConfig};

/// A configuration problem that prevents startup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("upstream base URL '{url}' is invalid: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("{0} must be greater than zero")]
    ZeroValue(&'static str),

    #[error("login path '{0}' must start with '/'")]
    InvalidLoginPath(String),

    #[error("cookie name must not be empty")]
    EmptyCookieName,
}

/// A configuration problem the proxy can run with.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigWarning {
    #[error("{mode} selected but credentials are incomplete; set UPSTREAM_USERNAME and UPSTREAM_PASSWORD")]
    MissingCredentials { mode: AuthMode },

    #[error("no upstream credentials configured; requests are forwarded unauthenticated")]
    Unauthenticated,
}

/// Validate a loaded configuration.
pub fn validate_config(config: &ProxyConfig) -> Result<Vec<ConfigWarning>, Vec<ValidationError>> {
    let mut errors = Vec::new();
    let upstream = &config.upstream;

    match Url::parse(&upstream.base_url) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        Ok(url) => errors.push(ValidationError::InvalidBaseUrl {
            url: upstream.base_url.clone(),
            reason: format!("unsupported scheme '{}'", url.scheme()),
        }),
        Err(e) => errors.push(ValidationError::InvalidBaseUrl {
            url: upstream.base_url.clone(),
            reason: e.to_string(),
        }),
    }

    let positive = [
        ("upstream.request_timeout_secs", upstream.request_timeout_secs),
        ("upstream.login_timeout_secs", upstream.login_timeout_secs),
        ("upstream.connect_timeout_secs", upstream.connect_timeout_secs),
        ("listener.request_timeout_secs", config.listener.request_timeout_secs),
        ("listener.max_body_size", config.listener.max_body_size as u64),
    ];
    for (name, value) in positive {
        if value == 0 {
            errors.push(ValidationError::ZeroValue(name));
        }
    }

    if !upstream.login_path.starts_with('/') {
        errors.push(ValidationError::InvalidLoginPath(upstream.login_path.clone()));
    }

    if upstream.cookie_name.trim().is_empty() {
        errors.push(ValidationError::EmptyCookieName);
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    let mut warnings = Vec::new();
    match upstream.effective_auth_mode() {
        mode @ (AuthMode::CookieLogin | AuthMode::BasicAuth) => {
            if upstream.effective_username().is_empty() || upstream.effective_password().is_empty() {
                warnings.push(ConfigWarning::MissingCredentials { mode });
            }
        }
        AuthMode::None => warnings.push(ConfigWarning::Unauthenticated),
    }

    Ok(warnings)
}

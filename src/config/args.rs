//! Command-line and environment overrides.
//!
//! Every flag can also be supplied through the environment variable named
//! in its `env` attribute. Overrides win over the TOML file and defaults.

use clap::Args;
use std::path::PathBuf;

use crate::config::schema::{AuthMode, LogFormat, ProxyConfig};

/// Overrides layered on top of the loaded configuration.
#[derive(Debug, Clone, Default, Args)]
pub struct ConfigOverrides {
    /// Path to a TOML configuration file.
    #[arg(short, long, env = "PROXY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Base URL of the upstream API.
    #[arg(long, env = "UPSTREAM_API_URL")]
    pub upstream_url: Option<String>,

    /// Authentication mode (inferred from the credentials when omitted).
    #[arg(long, env = "UPSTREAM_AUTH_MODE", value_enum)]
    pub auth_mode: Option<AuthMode>,

    /// Login identity.
    #[arg(long, env = "UPSTREAM_USERNAME")]
    pub username: Option<String>,

    /// Login secret.
    #[arg(long, env = "UPSTREAM_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Login form path on the upstream.
    #[arg(long, env = "UPSTREAM_LOGIN_PATH")]
    pub login_path: Option<String>,

    /// Session cookie name.
    #[arg(long, env = "UPSTREAM_COOKIE_NAME")]
    pub cookie_name: Option<String>,

    /// Proxy bind host.
    #[arg(long, env = "PROXY_HOST")]
    pub host: Option<String>,

    /// Proxy bind port.
    #[arg(short, long, env = "PROXY_PORT")]
    pub port: Option<u16>,

    /// Log output format.
    #[arg(long, env = "LOG_FORMAT", value_enum)]
    pub log_format: Option<LogFormat>,
}

impl ConfigOverrides {
    /// Apply the set overrides to `config`.
    pub fn apply(&self, config: &mut ProxyConfig) {
        let upstream = &mut config.upstream;
        if let Some(url) = &self.upstream_url {
            upstream.base_url = url.clone();
        }
        if let Some(mode) = self.auth_mode {
            upstream.auth_mode = Some(mode);
        }
        if let Some(username) = &self.username {
            upstream.username = Some(username.clone());
        }
        if let Some(password) = &self.password {
            upstream.password = Some(password.clone());
        }
        if let Some(path) = &self.login_path {
            upstream.login_path = path.clone();
        }
        if let Some(name) = &self.cookie_name {
            upstream.cookie_name = name.clone();
        }
        if let Some(host) = &self.host {
            config.listener.host = host.clone();
        }
        if let Some(port) = self.port {
            config.listener.port = port;
        }
        if let Some(format) = self.log_format {
            config.observability.log_format = format;
        }
    }
}

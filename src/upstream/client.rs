//! Outbound HTTP client for the upstream API.
//!
//! # Responsibilities
//! - Hold the pooled `reqwest::Client` shared by login and forwarding
//! - Build target URLs from the base URL and the inbound path
//! - Send a `ProxyRequest` and buffer the answer into a `ProxyResponse`
//!
//! # Design Decisions
//! - Redirects are never followed; they reach the caller untouched
//! - Every send carries its own timeout; connect timeout set on the client
//! - `Accept` and `User-Agent` defaults only apply when the caller sent none

use axum::http::{header, HeaderMap, HeaderValue};
use std::time::Duration;
use thiserror::Error;

use crate::config::UpstreamConfig;
use crate::http::{ProxyRequest, ProxyResponse};

/// Failure talking to the upstream.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),

    #[error("invalid user agent '{0}'")]
    InvalidUserAgent(String),

    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

impl UpstreamError {
    pub(crate) fn from_send(url: &str, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            UpstreamError::Timeout { url: url.to_string() }
        } else {
            UpstreamError::Transport {
                url: url.to_string(),
                source,
            }
        }
    }
}

/// Pooled client bound to one upstream base URL.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    http: reqwest::Client,
    base_url: String,
    request_timeout: Duration,
}

impl UpstreamClient {
    /// Create a client from the upstream configuration.
    pub fn new(config: &UpstreamConfig) -> Result<Self, UpstreamError> {
        let mut defaults = HeaderMap::new();
        defaults.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        let user_agent = HeaderValue::from_str(&config.user_agent)
            .map_err(|_| UpstreamError::InvalidUserAgent(config.user_agent.clone()))?;
        defaults.insert(header::USER_AGENT, user_agent);

        let http = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .connect_timeout(config.connect_timeout())
            .default_headers(defaults)
            .no_proxy()
            .build()
            .map_err(UpstreamError::Build)?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            request_timeout: config.request_timeout(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The underlying pooled client.
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// `base_url + '/' + path` with leading slashes collapsed, query appended verbatim.
    pub fn target_url(&self, path: &str, query: Option<&str>) -> String {
        let mut url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        if let Some(query) = query {
            url.push('?');
            url.push_str(query);
        }
        url
    }

    /// Send one attempt of `request` and buffer the upstream response.
    pub async fn forward(&self, request: &ProxyRequest) -> Result<ProxyResponse, UpstreamError> {
        let url = self.target_url(&request.path, request.query.as_deref());

        tracing::debug!(method = %request.method, url = %url, "Forwarding to upstream");

        let response = self
            .http
            .request(request.method.clone(), url.as_str())
            .headers(request.headers.clone())
            .body(request.body.clone())
            .timeout(self.request_timeout)
            .send()
            .await
            .map_err(|e| UpstreamError::from_send(&url, e))?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .bytes()
            .await
            .map_err(|e| UpstreamError::from_send(&url, e))?;

        Ok(ProxyResponse::from_upstream(status, headers, body))
    }
}

//! Forwarding engine.
//!
//! Turns one inbound request into at most two upstream attempts and
//! exactly one response. All upstream failures end here; nothing escapes
//! as an error to the server.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use std::sync::Arc;
use std::time::Instant;

use crate::auth::CredentialManager;
use crate::http::{CaptureError, ProxyRequest, ProxyResponse};
use crate::observability::metrics;
use crate::resilience::{AuthRetry, Step};
use crate::upstream::UpstreamClient;

/// Forwards requests to the upstream with the shared credential.
#[derive(Debug, Clone)]
pub struct ForwardingEngine {
    upstream: UpstreamClient,
    credentials: Arc<CredentialManager>,
    body_limit: usize,
}

impl ForwardingEngine {
    pub fn new(upstream: UpstreamClient, credentials: Arc<CredentialManager>, body_limit: usize) -> Self {
        Self {
            upstream,
            credentials,
            body_limit,
        }
    }

    /// Handle one inbound request end to end.
    pub async fn handle(&self, inbound: Request<Body>) -> ProxyResponse {
        let start = Instant::now();
        let method = inbound.method().clone();

        let response = match ProxyRequest::capture(inbound, self.body_limit).await {
            Ok(request) => self.forward(&request).await,
            Err(e @ CaptureError::BodyTooLarge { .. }) => {
                tracing::warn!(error = %e, "Rejecting inbound request");
                ProxyResponse::plain(StatusCode::PAYLOAD_TOO_LARGE, e.to_string())
            }
            Err(e) => {
                tracing::warn!(error = %e, "Rejecting inbound request");
                ProxyResponse::plain(StatusCode::BAD_REQUEST, e.to_string())
            }
        };

        metrics::record_request(method.as_str(), response.status.as_u16(), start);
        response
    }

    /// Send a captured request, refreshing the credential and retrying once on 401.
    pub async fn forward(&self, request: &ProxyRequest) -> ProxyResponse {
        tracing::info!(
            method = %request.method,
            path = %request.path,
            "Proxying request"
        );

        let mut retry = AuthRetry::new();
        loop {
            let mut outbound = request.clone();
            self.credentials.apply(&mut outbound);

            let response = match self.upstream.forward(&outbound).await {
                Ok(response) => response,
                Err(e) => {
                    retry.on_transport_error();
                    metrics::record_upstream_error();
                    tracing::error!(
                        attempt = retry.attempts(),
                        error = %e,
                        "Error proxying request"
                    );
                    return ProxyResponse::bad_gateway(&e);
                }
            };

            match retry.on_response(response.status) {
                Step::Deliver => {
                    tracing::debug!(
                        status = %response.status,
                        attempts = retry.attempts(),
                        "Upstream responded"
                    );
                    return response;
                }
                Step::RefreshAndRetry => {
                    tracing::warn!(
                        path = %request.path,
                        "Upstream returned 401, refreshing credential"
                    );
                    if let Err(e) = self.credentials.refresh().await {
                        tracing::warn!(error = %e, "Credential refresh failed; retrying with current credential");
                    }
                    retry.on_refreshed();
                }
            }
        }
    }
}

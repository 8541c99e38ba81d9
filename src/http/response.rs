//! Response handling and transformation.
//!
//! # Responsibilities
//! - Carry the upstream status, headers, and body back to the client
//! - Strip headers the proxy recomputes when re-framing the body
//! - Synthesize plain-text responses for proxy-side failures
//!
//! # Design Decisions
//! - Bodies are buffered; content-length is recomputed by the server
//! - Multi-valued headers (e.g. `Set-Cookie`) are preserved in order

use axum::body::{Body, Bytes};
use axum::http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};

/// Response headers dropped because the proxy re-frames and decodes the body.
pub const HOP_BY_HOP_HEADERS: [HeaderName; 4] = [
    header::CONTENT_ENCODING,
    header::CONTENT_LENGTH,
    header::TRANSFER_ENCODING,
    header::CONNECTION,
];

/// A response ready to be returned to the downstream caller.
#[derive(Debug, Clone)]
pub struct ProxyResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl ProxyResponse {
    /// Wrap an upstream response, removing hop-by-hop headers.
    pub fn from_upstream(status: StatusCode, mut headers: HeaderMap, body: Bytes) -> Self {
        for name in &HOP_BY_HOP_HEADERS {
            headers.remove(name);
        }
        Self { status, headers, body }
    }

    /// A plain-text response generated by the proxy itself.
    pub fn plain(status: StatusCode, message: impl Into<String>) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("text/plain; charset=utf-8"),
        );
        Self {
            status,
            headers,
            body: Bytes::from(message.into()),
        }
    }

    /// 502 for an upstream the proxy could not talk to.
    pub fn bad_gateway(error: &dyn std::fmt::Display) -> Self {
        Self::plain(StatusCode::BAD_GATEWAY, format!("Proxy error: {}", error))
    }
}

impl IntoResponse for ProxyResponse {
    fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}

//! Request capture.
//!
//! # Responsibilities
//! - Buffer the inbound request into a replayable `ProxyRequest`
//! - Drop transport-level headers (`Host`, framing, connection management)
//! - Drop `Accept-Encoding` so only decodable encodings are negotiated upstream
//! - Enforce the inbound body size limit
//!
//! # Design Decisions
//! - The snapshot is immutable once captured; every attempt clones it
//! - Query string kept verbatim so repeated keys and encoding survive
//! - Body held as `Bytes`, so cloning for the retry is cheap

use axum::body::{Body, Bytes};
use axum::http::{header, HeaderMap, HeaderName, Method, Request, Uri};
use http_body_util::LengthLimitError;
use thiserror::Error;

/// Inbound headers that describe the downstream connection, not the request.
const TRANSPORT_HEADERS: [HeaderName; 9] = [
    header::HOST,
    header::CONNECTION,
    header::TRANSFER_ENCODING,
    header::TE,
    header::UPGRADE,
    header::CONTENT_LENGTH,
    header::ACCEPT_ENCODING,
    HeaderName::from_static("keep-alive"),
    HeaderName::from_static("proxy-connection"),
];

/// Failure to buffer the inbound request.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("request body exceeds {limit} bytes")]
    BodyTooLarge { limit: usize },

    #[error("failed to read request body: {0}")]
    Body(axum::Error),
}

/// A snapshot of one inbound request.
#[derive(Debug, Clone)]
pub struct ProxyRequest {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl ProxyRequest {
    /// Build a snapshot from already-buffered parts.
    pub fn from_parts(method: Method, uri: &Uri, mut headers: HeaderMap, body: Bytes) -> Self {
        for name in &TRANSPORT_HEADERS {
            headers.remove(name);
        }

        Self {
            method,
            path: uri.path().to_string(),
            query: uri.query().map(str::to_string),
            headers,
            body,
        }
    }

    /// Buffer an inbound request, reading at most `body_limit` bytes.
    pub async fn capture(request: Request<Body>, body_limit: usize) -> Result<Self, CaptureError> {
        let (parts, body) = request.into_parts();
        let body = axum::body::to_bytes(body, body_limit).await.map_err(|e| {
            if exceeded_limit(&e) {
                CaptureError::BodyTooLarge { limit: body_limit }
            } else {
                CaptureError::Body(e)
            }
        })?;

        Ok(Self::from_parts(parts.method, &parts.uri, parts.headers, body))
    }
}

fn exceeded_limit(error: &axum::Error) -> bool {
    let mut source: Option<&(dyn std::error::Error + 'static)> = Some(error);
    while let Some(err) = source {
        if err.is::<LengthLimitError>() {
            return true;
        }
        source = err.source();
    }
    false
}

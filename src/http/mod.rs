//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, tracing span, inbound timeout)
//!     → /health → health.rs (static answer)
//!     → /{*path} → request.rs (capture snapshot)
//!         → proxy::ForwardingEngine
//!         → response.rs (strip hop-by-hop headers)
//!     → Send to client
//! ```

pub mod health;
pub mod request;
pub mod response;
pub mod server;

pub use request::{CaptureError, ProxyRequest};
pub use response::{ProxyResponse, HOP_BY_HOP_HEADERS};
pub use server::{AppState, HttpServer, ServerError};

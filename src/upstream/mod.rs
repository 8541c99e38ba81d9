//! Upstream connectivity subsystem.
//!
//! # Data Flow
//! ```text
//! ProxyRequest (credential applied)
//!     → client.rs (target URL, pooled reqwest client, timeouts)
//!     → upstream API
//!     → ProxyResponse (hop-by-hop headers removed) or UpstreamError
//! ```
//!
//! # Design Decisions
//! - One client per process; connections are pooled across requests
//! - The credential manager logs in through the same client

pub mod client;

pub use client::{UpstreamClient, UpstreamError};

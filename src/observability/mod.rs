//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events, request-id spans)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stdout (pretty or JSON)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! # Design Decisions
//! - Request ID attached to a span per inbound request
//! - Metrics are cheap (atomic increments)
//! - Secrets never logged; session tokens only as a short prefix

pub mod logging;
pub mod metrics;

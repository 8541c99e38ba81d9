//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Upstream answer:
//!     → retries.rs (401? refresh credential, resend once)
//!     → deliver to caller
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every upstream call has a deadline
//!   (configured on the upstream client)
//! - The only retry is the post-refresh resend after a 401

pub mod retries;

pub use retries::{AttemptState, AuthRetry, Step};

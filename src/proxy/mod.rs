//! Forwarding subsystem.
//!
//! # Data Flow
//! ```text
//! inbound request
//!     → http/request.rs (capture snapshot)
//!     → engine.rs
//!         loop:
//!           auth (apply credential to a copy of the snapshot)
//!           → upstream (send with timeout, no redirects)
//!           → resilience (deliver, or refresh + resend once on 401)
//!     → http/response.rs (hop-by-hop stripped) → caller
//! ```

pub mod engine;

pub use engine::ForwardingEngine;

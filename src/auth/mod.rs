//! Credential management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     UpstreamConfig → manager.rs selects strategy (cookie / basic / none)
//!     → acquire(): cookie.rs posts the login form, stores the session token
//!
//! Per request:
//!     apply(): snapshot of the credential → Cookie or Authorization header
//!
//! On upstream 401:
//!     refresh(): same as acquire, new token swapped in atomically
//! ```
//!
//! # Design Decisions
//! - Strategy chosen once; no per-request branching on configuration
//! - Acquisition failures are returned, logged by the caller, never fatal
//! - Passwords and tokens never appear in `Debug` output

pub mod basic;
pub mod cookie;
pub mod error;
pub mod manager;

pub use basic::BasicCredentials;
pub use cookie::{CookieLogin, SessionToken};
pub use error::{AuthError, AuthResult};
pub use manager::{AuthStrategy, CredentialManager};

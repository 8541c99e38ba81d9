//! Authenticating reverse proxy library.
//!
//! Forwards arbitrary HTTP requests to one upstream API, attaching a shared
//! credential (session cookie or Basic auth) and transparently logging in
//! again when the upstream answers 401.

pub mod auth;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod proxy;
pub mod resilience;
pub mod upstream;

pub use auth::CredentialManager;
pub use config::ProxyConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use proxy::ForwardingEngine;

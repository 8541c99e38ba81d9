//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! defaults (ProxyConfig::default)
//!     → loader.rs (optional TOML file)
//!     → args.rs (CLI flags / environment variables)
//!     → validation.rs (semantic checks, warnings)
//!     → ProxyConfig (validated, immutable)
//!     → shared by value with every subsystem at startup
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow an empty environment
//! - Missing credentials are warnings; malformed values are errors

pub mod args;
pub mod loader;
pub mod schema;
pub mod validation;

pub use args::ConfigOverrides;
pub use loader::{load_config, ConfigError, LoadedConfig};
pub use schema::{AuthMode, ListenerConfig, LogFormat, ObservabilityConfig, ProxyConfig, UpstreamConfig};
pub use validation::{ConfigWarning, ValidationError};

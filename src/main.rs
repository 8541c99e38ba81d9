//! Authenticating reverse proxy.
//!
//! # Architecture Overview
//!
//! ```text
//!                         ┌──────────────────────────────────────────────┐
//!                         │                  AUTH PROXY                  │
//!                         │                                              │
//!   Client Request        │  ┌─────────┐    ┌──────────────────┐         │
//!   ──────────────────────┼─▶│  http   │───▶│ proxy::Forwarding│         │
//!                         │  │ server  │    │      Engine      │         │
//!                         │  └─────────┘    └───┬──────────┬───┘         │
//!                         │                     │ apply    │ 401 →       │
//!                         │                     ▼          ▼ refresh     │
//!                         │              ┌────────────────────────┐      │
//!                         │              │   auth::Credential     │      │
//!                         │              │   Manager (ArcSwap)    │      │
//!                         │              └───────────┬────────────┘      │
//!                         │                          │ login             │
//!   Client Response       │  ┌─────────┐    ┌────────▼─────────┐         │
//!   ◀─────────────────────┼──│response │◀───│ upstream client  │◀────────┼──── Upstream
//!                         │  │ (strip) │    │ (pooled reqwest) │         │     API
//!                         │  └─────────┘    └──────────────────┘         │
//!                         └──────────────────────────────────────────────┘
//! ```

use auth_proxy::config::{load_config, ConfigOverrides};
use auth_proxy::observability::logging::init_logging;
use clap::Parser;

#[derive(Parser)]
#[command(name = "auth-proxy", version)]
#[command(about = "Reverse proxy that logs in to an upstream API and forwards requests with the session", long_about = None)]
struct Cli {
    #[command(flatten)]
    overrides: ConfigOverrides,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let loaded = load_config(&cli.overrides)?;
    let config = loaded.config;

    init_logging(&config.observability);

    tracing::info!("auth-proxy v{} starting", env!("CARGO_PKG_VERSION"));

    for warning in &loaded.warnings {
        tracing::warn!("{}", warning);
    }

    tracing::info!(
        bind_address = %config.listener.bind_address(),
        upstream = %config.upstream.base_url,
        auth_mode = %config.upstream.effective_auth_mode(),
        request_timeout_secs = config.upstream.request_timeout_secs,
        "Configuration loaded"
    );

    auth_proxy::lifecycle::run(config).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

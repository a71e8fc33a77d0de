//! Filtering reverse proxy (v1)
//!
//! Sits in front of an upstream that serves both JSON-RPC and large file
//! downloads, and only lets whitelisted JSON-RPC methods through.
//!
//! # Architecture Overview
//!
//! ```text
//!                          ┌──────────────────────────────────────────────────────┐
//!                          │                  FILTERING PROXY                     │
//!                          │                                                      │
//!     Client Request       │  ┌─────────┐    ┌────────────┐                       │
//!     ─────────────────────┼─▶│  http   │───▶│ classifier │                       │
//!                          │  │ server  │    └─────┬──────┘                       │
//!                          │  └─────────┘          │                              │
//!                          │        download path  │  other paths                 │
//!                          │              ┌────────┴────────┐                     │
//!                          │              ▼                 ▼                     │
//!                          │     ┌──────────────┐   ┌──────────────┐              │
//!                          │     │  streaming   │   │ JSON-RPC?    │──▶ policy    │
//!                          │     │  forwarder   │   │ buffered fwd │   (403 deny) │
//!                          │     └──────┬───────┘   └──────┬───────┘              │
//!                          │            │                  │                      │
//!     Client Response      │            ▼                  ▼                      │
//!     ◀────────────────────┼───── attachment stream   application/json ◀─────────┼──── Upstream
//!                          └──────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use rpc_filter_proxy::lifecycle::{self, signals, Overrides, Shutdown};
use rpc_filter_proxy::observability::logging;

#[derive(Parser)]
#[command(name = "rpc-filter-proxy")]
#[command(about = "Filtering reverse proxy for JSON-RPC and snapshot downloads", long_about = None)]
struct Cli {
    /// Path to the JSON config file.
    #[arg(short, long, default_value = "config.json")]
    config: PathBuf,

    /// Override the listener bind address.
    #[arg(long)]
    bind: Option<String>,

    /// Override the upstream base URL.
    #[arg(long)]
    upstream: Option<String>,

    /// Log filter directives (takes precedence over RUST_LOG).
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    logging::init_logging(cli.log_level.as_deref());

    tracing::info!("rpc-filter-proxy v{} starting", env!("CARGO_PKG_VERSION"));

    let overrides = Overrides {
        bind_address: cli.bind,
        upstream_url: cli.upstream,
    };

    let prepared = match lifecycle::prepare(&cli.config, &overrides).await {
        Ok(prepared) => prepared,
        Err(e) => {
            tracing::error!(error = %e, "Startup failed");
            return Err(e.into());
        }
    };

    tracing::info!(
        address = %prepared.listener.local_addr()?,
        upstream = %prepared.config.upstream.url,
        whitelisted = prepared.config.whitelisted_methods.len(),
        blacklisted = prepared.config.blacklisted_methods.len(),
        metrics_enabled = prepared.config.observability.metrics_enabled,
        "Listening for connections"
    );

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        signals::wait_for_termination().await;
        shutdown.trigger();
    });

    prepared.server.run(prepared.listener, server_shutdown).await?;

    tracing::info!("Server shut down");
    Ok(())
}

//! User Service
//!
//! Serves user records and a recommended product fetched from the product
//! service through a circuit breaker and an exponential-backoff retry loop.
//!
//! # Architecture Overview
//!
//! ```text
//!   Client ──▶ http (axum) ──▶ users ──▶ resilience ──────────▶ upstream ──▶ Product
//!                  │                      │ invoker               (reqwest)     Service
//!                  │                      │ circuit_breaker
//!                  │                      │ retries + backoff
//!                  ▼                      ▼
//!              /metrics ◀──────── observability (tracing, metrics)
//! ```

use clap::Parser;
use std::path::PathBuf;
use tokio::net::TcpListener;

use user_service::config::{self, ServiceConfig};
use user_service::http::HttpServer;
use user_service::lifecycle::Shutdown;
use user_service::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "user-service")]
#[command(about = "User service with a resilient product-service client", long_about = None)]
struct Args {
    /// Path to a TOML configuration file; defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => config::load_config(path)?,
        None => ServiceConfig::default(),
    };
    config::apply_env_overrides(&mut config);

    logging::init_logging(&config.observability);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "user-service starting");

    tracing::info!(
        bind_address = %config.listener.bind_address,
        dependency = %config.upstream.name,
        upstream = %config.upstream.base_url,
        failure_threshold = config.circuit_breaker.failure_threshold,
        reset_timeout_ms = config.circuit_breaker.reset_timeout_ms,
        retry_attempts = config.retries.max_attempts,
        retry_initial_delay_ms = config.retries.initial_delay_ms,
        "Configuration loaded"
    );

    let metrics_handle = if config.observability.metrics_enabled {
        Some(metrics::init_metrics()?)
    } else {
        None
    };

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    shutdown.trigger_on_signals();

    let server = HttpServer::new(config, metrics_handle)?;
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

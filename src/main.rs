//! Counter service entry point.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request          ┌──────────────────────────────────────────────┐
//!     ────────────────────────┼─▶ http::server (request id, trace, timeout)  │
//!                             │        │                                      │
//!                             │        ▼                                      │
//!                             │   api::handlers ── /health, /api/data          │
//!                             │        │                                      │
//!                             │        ▼ /api/counter                         │
//!                             │   health::state gate (Alive?) ──no──▶ 503     │
//!                             │        │ yes                                  │
//!                             │        ▼                                      │
//!                             │   store::connector ── INCR ────────────────────┼──▶ Redis
//!                             └──────────────────────────────────────────────┘
//! ```

use clap::Parser;
use std::path::PathBuf;
use tokio::net::TcpListener;

use counter_service::config;
use counter_service::http::HttpServer;
use counter_service::lifecycle::{self, signals, Shutdown, StartupError};
use counter_service::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "counter-service")]
#[command(about = "Health, info and a shared Redis-backed hit counter over HTTP", long_about = None)]
struct Args {
    /// Optional TOML configuration file; environment variables override it.
    #[arg(short, long, env = "COUNTER_SERVICE_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = config::load(args.config.as_deref()).map_err(StartupError::from)?;

    logging::init_logging(config.observability.log_format)?;

    tracing::info!("counter-service v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        store = ?config.store,
        instance = %config.instance.id,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let state = lifecycle::prepare(&config).await?;

    let listener = TcpListener::bind(&config.listener.bind_address)
        .await
        .map_err(StartupError::from)?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config, state);
    let mut server_task = tokio::spawn(server.run(listener, shutdown.subscribe()));

    tokio::select! {
        _ = signals::wait_for_termination() => {
            shutdown.trigger();
            server_task.await??;
        }
        result = &mut server_task => result??,
    }

    tracing::info!("Shutdown complete");
    Ok(())
}

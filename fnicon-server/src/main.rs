// Lint configuration for this crate
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! fnicon - dashboard icon launcher manager.
//!
//! # Examples
//!
//! ```bash
//! # Serve ./public on 0.0.0.0:3000
//! fnicon
//!
//! # Custom port and directory, debug logging
//! fnicon --port 8080 --public-dir /srv/fnicon --verbose
//! ```

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use fnicon_core::SystemClock;
use fnicon_fetch::HttpFetcher;
use fnicon_server::{AppState, Cli, build_router, startup};
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

// ============================================================================
// Logging
// ============================================================================

fn setup_logging(verbose: bool, quiet: bool) {
    if quiet {
        return;
    }

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("fnicon=debug,info")
        } else {
            EnvFilter::new("fnicon=info,warn")
        }
    });

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = cli.server_config();
    let fetcher = HttpFetcher::new().context("building HTTP client")?;
    let state = AppState::new(config, Arc::new(fetcher), Arc::new(SystemClock));

    if cli.skip_startup {
        fnicon_store::ensure_dir(&state.config.conf_dir)
            .await
            .context("creating configuration directory")?;
    } else {
        startup::run(&state)
            .await
            .context("preparing configuration directory")?;
    }

    let sweeper = Arc::clone(&state.sessions).spawn_sweeper(state.config.sweep_interval);

    let addr = cli.addr();
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(%addr, public = %state.config.public_dir.display(), "Listening");

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving HTTP")?;

    sweeper.abort();
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

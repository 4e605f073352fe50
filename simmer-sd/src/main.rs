//! Session Daemon (simmer-sd) - Main entry point
//!
//! Hosts the recipe catalog and the cooking session engine for Simmer.
//! All timing authority lives here; UI surfaces subscribe over SSE and
//! render the snapshots they are sent.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use simmer_common::events::EventBus;
use simmer_sd::session::{driver, SessionEngine};
use simmer_sd::store::RecipeStore;
use simmer_sd::api;

/// Command-line arguments for simmer-sd
#[derive(Parser, Debug)]
#[command(name = "simmer-sd")]
#[command(about = "Session daemon for Simmer")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "5750", env = "SIMMER_SD_PORT")]
    port: u16,

    /// Data folder holding recipes.json
    #[arg(short, long)]
    data_folder: Option<PathBuf>,

    /// Session tick cadence in milliseconds
    #[arg(long, default_value = "1000", env = "SIMMER_TICK_CADENCE_MS")]
    tick_cadence_ms: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "simmer_sd=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Parse command-line arguments
    let args = Args::parse();

    info!("Starting Simmer session daemon on port {}", args.port);

    let data_folder = simmer_common::config::resolve_data_folder(
        args.data_folder.as_deref().and_then(|p| p.to_str()),
        "SIMMER_DATA_FOLDER",
    )
    .context("Failed to resolve data folder")?;
    info!("Data folder: {}", data_folder.display());

    // Hydrate the recipe catalog
    let store = RecipeStore::load(&data_folder)
        .await
        .context("Failed to load recipe catalog")?;
    info!("Recipe catalog loaded ({} recipes)", store.list().await.len());

    // Event bus shared by the engine and SSE clients
    let events = Arc::new(EventBus::new(100));

    // Session engine and its tick cadence
    let engine = Arc::new(SessionEngine::new(store.clone(), events.clone()));
    driver::spawn(engine.clone(), Duration::from_millis(args.tick_cadence_ms));

    // Build the application router
    let ctx = api::AppContext {
        engine,
        store,
        events,
        port: args.port,
    };
    let app = api::create_router(ctx);

    // Create socket address
    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));

    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}

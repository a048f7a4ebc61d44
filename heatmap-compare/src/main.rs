//! heatmap-compare - side-by-side births heatmap service
//!
//! Serves comparison pages, aligned JSON payloads and single SVG heatmaps
//! from a directory or URL of exported series documents.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::info;

use heatmap_common::config::{ConfigOverrides, HeatmapConfig};
use heatmap_compare::loader::data_source_for;
use heatmap_compare::{build_router, AppState};

/// Command-line arguments for heatmap-compare
#[derive(Parser, Debug)]
#[command(name = "heatmap-compare")]
#[command(about = "Side-by-side births heatmap comparison service")]
#[command(version)]
struct Args {
    /// Data root: directory or http(s) base URL of the exported JSON
    /// (falls back to HEATMAP_DATA_ROOT)
    #[arg(short, long)]
    data_root: Option<String>,

    /// Address to bind (falls back to HEATMAP_HOST)
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on (falls back to HEATMAP_COMPARE_PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// Default color scale mode when a request does not choose one
    #[arg(long, value_parser = ["unified", "per-country"])]
    default_scale: Option<String>,

    /// Heatmap viewport width in pixels
    #[arg(long)]
    width: Option<f64>,

    /// Config file (defaults to the user config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "heatmap_compare=info,heatmap_common=info,tower_http=info".into()),
        )
        .init();

    info!(
        "Starting heatmap-compare v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let args = Args::parse();
    let overrides = ConfigOverrides {
        data_root: args.data_root,
        host: args.host,
        port: args.port,
        default_scale: args.default_scale,
        width: args.width,
        config_file: args.config,
    };
    let config = HeatmapConfig::resolve(&overrides).context("Failed to resolve configuration")?;

    let source = data_source_for(&config.data_root).context("Failed to set up data source")?;
    info!(data_root = %config.data_root, scale = config.default_scale.as_str(), "Data source ready");

    let addr = format!("{}:{}", config.host, config.port);
    let state = AppState::new(source, config);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("heatmap-compare listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
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

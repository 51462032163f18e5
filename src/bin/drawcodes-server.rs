//! HTTP server binary for drawcodes.
//!
//! Serves the extraction pipeline behind two routes:
//! `GET /` (health) and `POST /extract` (multipart PDF upload).

use anyhow::{Context, Result};
use clap::Parser;
use drawcodes::ExtractConfig;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Serve green-marked code extraction over HTTP.
#[derive(Parser, Debug)]
#[command(name = "drawcodes-server", version)]
struct Cli {
    /// Address to listen on.
    #[arg(short, long, env = "DRAWCODES_LISTEN", default_value = "0.0.0.0:8080")]
    listen: SocketAddr,

    /// Minimum green channel value for a span to count as marked.
    #[arg(long, env = "DRAWCODES_GREEN_MIN", default_value_t = 110)]
    green_min: u8,

    /// How far green must exceed red and blue.
    #[arg(long, env = "DRAWCODES_DOMINANCE", default_value_t = 20)]
    dominance: u8,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ExtractConfig::builder()
        .marker_green_min(cli.green_min)
        .marker_dominance(cli.dominance)
        .build()
        .context("Invalid configuration")?;

    let app = drawcodes::server::router(config);

    let listener = TcpListener::bind(&cli.listen)
        .await
        .with_context(|| format!("Failed to bind {}", cli.listen))?;
    info!("drawcodes server listening on {}", cli.listen);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

use anyhow::{Context, Result};
use clap::Parser;
use constants::catalog::{DEFAULT_PORT, DEFAULT_PUBLIC_DIR, DEFAULT_TILES_DIR, TILESETS_ROUTE};
use std::net::SocketAddr;
use std::path::PathBuf;
use tileset_catalog::{CatalogConfig, router};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tileset-catalog")]
#[command(about = "Serve tileset descriptors and list them for the viewer")]
struct Cli {
    /// Port to listen on
    #[arg(long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Directory served under /public
    #[arg(long, default_value = DEFAULT_PUBLIC_DIR)]
    public_dir: PathBuf,

    /// Root walked for tileset descriptors, served under /tiles
    #[arg(long, default_value = DEFAULT_TILES_DIR)]
    tiles_dir: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let app = router(CatalogConfig {
        public_dir: cli.public_dir.clone(),
        tiles_dir: cli.tiles_dir.clone(),
    });

    let addr = SocketAddr::from(([0, 0, 0, 0], cli.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!("Tiles API server running at http://localhost:{}", cli.port);
    tracing::info!("Listing: http://localhost:{}{}", cli.port, TILESETS_ROUTE);
    tracing::info!("Static files: {} under /public", cli.public_dir.display());
    tracing::info!("Tilesets: {} under /tiles", cli.tiles_dir.display());

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}

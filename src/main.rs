//! audioshelf - Audio file upload and retrieval service
//!
//! REST endpoints for uploading audio files with metadata, tag-filtered
//! listing, individual download/delete, metadata lookup, and bulk ZIP
//! export, backed by a plain filesystem data directory.

use anyhow::Result;
use clap::Parser;
use tracing::info;

use audioshelf::config::{self, Cli};
use audioshelf::store::FileStore;
use audioshelf::{build_router, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    info!("Starting audioshelf v{}", env!("CARGO_PKG_VERSION"));

    // Resolve data directory (CLI > env > config file > default) and make
    // sure it exists before accepting uploads
    let data_dir = config::resolve_data_dir(cli.data_dir.as_deref());
    std::fs::create_dir_all(&data_dir)?;
    info!("Data directory: {}", data_dir.display());

    let state = AppState::new(FileStore::new(&data_dir));
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(("127.0.0.1", cli.port)).await?;
    info!("audioshelf listening on http://127.0.0.1:{}", cli.port);
    info!("Health check: http://127.0.0.1:{}/health", cli.port);

    axum::serve(listener, app).await?;

    Ok(())
}

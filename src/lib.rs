//! audioshelf library - HTTP audio file upload and retrieval service
//!
//! Users upload audio files with metadata (title, artist, description,
//! tags), list and tag-filter them per scope, download them individually
//! or as a bulk ZIP archive, and fetch metadata. Storage is a plain
//! filesystem tree with a JSON index per scope; see [`store`].

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod config;
pub mod error;
pub mod store;

pub use error::{Error, Result};

use store::FileStore;

/// Whole uploads are buffered by the multipart extractor, so the body
/// limit is what actually caps accepted file size.
const MAX_UPLOAD_BYTES: usize = 256 * 1024 * 1024;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Storage adapter over the injected data root
    pub store: Arc<FileStore>,
}

impl AppState {
    pub fn new(store: FileStore) -> Self {
        Self {
            store: Arc::new(store),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post};

    Router::new()
        .route("/upload", post(api::upload))
        .route("/list", get(api::list_files))
        .route("/download", get(api::download_archive))
        .route("/files/:id", get(api::get_file).delete(api::delete_file))
        .route("/files/:id/info", get(api::file_info))
        .merge(api::health_routes())
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        // Enable CORS for local access
        .layer(CorsLayer::permissive())
        .with_state(state)
}

//! HTTP API handlers for audioshelf

pub mod download;
pub mod files;
pub mod health;
pub mod list;

pub use download::download_archive;
pub use files::{delete_file, file_info, get_file, upload};
pub use health::health_routes;
pub use list::list_files;

use serde::Deserialize;

/// Query parameter selecting the owner namespace, shared by the
/// per-file and download endpoints
#[derive(Debug, Deserialize)]
pub struct ScopeQuery {
    pub scope: String,
}

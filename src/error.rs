//! Common error types for audioshelf

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Common result type for store and handler operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error taxonomy surfaced by the HTTP layer
#[derive(Error, Debug)]
pub enum Error {
    /// Requested file or scope not found
    #[error("not found: {0}")]
    NotFound(String),

    /// Malformed upload metadata or request parameter
    #[error("invalid input: {0}")]
    Validation(String),

    /// Disk or permission failure while persisting an upload
    #[error("write failed: {0}")]
    Write(String),

    /// Failure while assembling a bulk export archive
    #[error("export failed: {0}")]
    Export(String),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Metadata index could not be parsed or serialized
    #[error("metadata index error: {0}")]
    Index(#[from] serde_json::Error),
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match &self {
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::Write(_) | Error::Export(_) | Error::Io(_) | Error::Index(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(json!({
            "error": self.to_string(),
        }));

        (status, body).into_response()
    }
}

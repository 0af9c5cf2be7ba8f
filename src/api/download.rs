//! Bulk export endpoint

use axum::extract::{Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use tracing::info;

use super::ScopeQuery;
use crate::error::Result;
use crate::store::export::export_scope;
use crate::AppState;

/// GET /download?scope=
///
/// Single ZIP containing every blob the scope owns plus a metadata
/// manifest. 404 when the scope owns nothing.
pub async fn download_archive(
    State(state): State<AppState>,
    Query(query): Query<ScopeQuery>,
) -> Result<Response> {
    let bytes = export_scope(&state.store, &query.scope)?;
    info!(
        "exported {} byte archive for scope {}",
        bytes.len(),
        query.scope
    );

    let headers = [
        (header::CONTENT_TYPE, "application/zip".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"uploads_{}.zip\"", query.scope),
        ),
    ];
    Ok((headers, bytes).into_response())
}

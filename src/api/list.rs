//! Listing endpoint with optional tag filter

use axum::extract::{Query, State};
use axum::Json;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::store::filter::{filter_by_tags, normalize_tags};
use crate::store::FileRecord;
use crate::AppState;

/// Listing response
#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub scope: String,
    pub count: usize,
    pub items: Vec<FileRecord>,
}

/// GET /list?scope=&tags=
///
/// Returns the scope's records, narrowed by the tag filter when present.
/// The filter accepts comma-separated values, a repeated `tags` parameter,
/// or a mix of both; any overlapping tag qualifies a record. An unknown
/// scope yields an empty listing, not an error.
///
/// The query is extracted as raw pairs rather than a struct so a repeated
/// `tags` key is collected instead of rejected as a duplicate field.
pub async fn list_files(
    State(state): State<AppState>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Json<ListResponse>> {
    let mut scope = None;
    let mut raw_tags = Vec::new();
    for (key, value) in params {
        match key.as_str() {
            "scope" => scope = Some(value),
            "tags" => raw_tags.push(value),
            _ => {}
        }
    }
    let scope =
        scope.ok_or_else(|| Error::Validation("missing query parameter: scope".into()))?;

    let records = state.store.list(&scope)?;
    let wanted = normalize_tags(raw_tags.iter().flat_map(|v| v.split(',')));
    let items = filter_by_tags(records, &wanted);

    Ok(Json(ListResponse {
        scope,
        count: items.len(),
        items,
    }))
}

//! Upload and per-file endpoints

use std::collections::BTreeSet;

use axum::extract::{Multipart, Path, Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use super::ScopeQuery;
use crate::error::{Error, Result};
use crate::store::filter::normalize_tags;
use crate::store::{FileRecord, NewUpload};
use crate::AppState;

/// Multipart form accumulated field by field, then validated as a whole
#[derive(Debug, Default)]
struct UploadForm {
    scope: Option<String>,
    title: Option<String>,
    artist: Option<String>,
    description: Option<String>,
    tags: Option<String>,
    file: Option<(String, String, Vec<u8>)>,
}

impl UploadForm {
    /// Check required fields and produce the boundary struct the store takes.
    fn validate(self) -> Result<(String, NewUpload, Vec<u8>)> {
        let scope = require(self.scope, "scope")?;
        let title = require(self.title, "title")?;
        let artist = require(self.artist, "artist")?;
        let (filename, content_type, bytes) = self
            .file
            .ok_or_else(|| Error::Validation("missing field: file".into()))?;

        if filename.is_empty() {
            return Err(Error::Validation("uploaded file must have a filename".into()));
        }

        let upload = NewUpload {
            filename,
            content_type,
            title,
            artist,
            description: self.description.unwrap_or_default(),
            tags: self.tags.as_deref().map(parse_tags).unwrap_or_default(),
        };
        Ok((scope, upload, bytes))
    }
}

fn require(value: Option<String>, name: &str) -> Result<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(Error::Validation(format!("missing field: {}", name))),
    }
}

/// Tags arrive either as a JSON string array or as a comma-separated string.
fn parse_tags(raw: &str) -> BTreeSet<String> {
    if let Ok(parsed) = serde_json::from_str::<Vec<String>>(raw) {
        return normalize_tags(parsed);
    }
    normalize_tags(raw.split(','))
}

/// POST /upload
///
/// Multipart form: `file` plus `scope`, `title`, `artist` (required) and
/// `description`, `tags` (optional). Returns the stored record.
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<FileRecord>> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::Validation(format!("malformed multipart body: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "scope" => form.scope = Some(text_field(field).await?),
            "title" => form.title = Some(text_field(field).await?),
            "artist" => form.artist = Some(text_field(field).await?),
            "description" => form.description = Some(text_field(field).await?),
            "tags" => form.tags = Some(text_field(field).await?),
            "file" => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| Error::Validation(format!("reading file field: {}", e)))?;
                form.file = Some((filename, content_type, bytes.to_vec()));
            }
            // Unknown fields are ignored, matching lenient form handling
            _ => {}
        }
    }

    let (scope, new_upload, bytes) = form.validate()?;
    let record = state.store.put(&scope, new_upload, &bytes)?;

    info!(
        "stored upload {} ({} bytes) for scope {}",
        record.id, record.size_bytes, record.scope
    );
    Ok(Json(record))
}

async fn text_field(field: axum::extract::multipart::Field<'_>) -> Result<String> {
    field
        .text()
        .await
        .map_err(|e| Error::Validation(format!("reading form field: {}", e)))
}

/// GET /files/:id?scope=
///
/// Raw file bytes with the original content type and filename.
pub async fn get_file(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<ScopeQuery>,
) -> Result<Response> {
    let (bytes, record) = state.store.get(&query.scope, id)?;

    let headers = [
        (header::CONTENT_TYPE, record.content_type.clone()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", header_safe(&record.filename)),
        ),
    ];
    Ok((headers, bytes).into_response())
}

/// GET /files/:id/info?scope=
pub async fn file_info(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<ScopeQuery>,
) -> Result<Json<FileRecord>> {
    Ok(Json(state.store.record(&query.scope, id)?))
}

/// DELETE /files/:id?scope=
pub async fn delete_file(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<ScopeQuery>,
) -> Result<Json<serde_json::Value>> {
    state.store.delete(&query.scope, id)?;
    info!("deleted {} from scope {}", id, query.scope);
    Ok(Json(json!({ "status": "deleted", "id": id })))
}

/// Strip characters that would break a quoted Content-Disposition value
fn header_safe(filename: &str) -> String {
    filename
        .chars()
        .filter(|c| !c.is_control() && *c != '"')
        .collect()
}

//! Bulk export builder
//!
//! Bundles every blob a scope owns, plus a `metadata.json` manifest, into a
//! single ZIP archive. Entries are stored uncompressed; the payload is audio
//! that rarely deflates, and store-only keeps the builder a straight copy.
//! The first read failure aborts the whole export, so callers never see a
//! partial archive.

use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::FileStore;
use crate::error::{Error, Result};

/// Archive folder holding the blobs, mirroring the on-disk layout
const BLOB_DIR: &str = "uploads";

/// Manifest entry name inside the archive
const MANIFEST_NAME: &str = "metadata.json";

/// Build a ZIP of all files owned by `scope`.
///
/// Fails with `NotFound` when the scope owns nothing, and with `Export`
/// wrapping the first underlying failure otherwise.
pub fn export_scope(store: &FileStore, scope: &str) -> Result<Vec<u8>> {
    let mut records = store.list(scope)?;
    if records.is_empty() {
        return Err(Error::NotFound(format!("no uploads found for scope {}", scope)));
    }
    records.sort_by(|a, b| a.created_at.cmp(&b.created_at));

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);

    for record in &records {
        let (bytes, _) = store
            .get(scope, record.id)
            .map_err(|e| Error::Export(format!("reading {}: {}", record.id, e)))?;

        zip.start_file(format!("{}/{}", BLOB_DIR, record.blob_name()), options)
            .map_err(|e| Error::Export(format!("adding {}: {}", record.id, e)))?;
        zip.write_all(&bytes)
            .map_err(|e| Error::Export(format!("writing {}: {}", record.id, e)))?;
    }

    let manifest = serde_json::to_vec_pretty(&records)?;
    zip.start_file(MANIFEST_NAME, options)
        .map_err(|e| Error::Export(format!("adding manifest: {}", e)))?;
    zip.write_all(&manifest)
        .map_err(|e| Error::Export(format!("writing manifest: {}", e)))?;

    let cursor = zip
        .finish()
        .map_err(|e| Error::Export(format!("finalizing archive: {}", e)))?;
    Ok(cursor.into_inner())
}

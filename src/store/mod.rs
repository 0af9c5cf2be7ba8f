//! Filesystem-backed storage for uploaded audio files
//!
//! Layout under the injected data root:
//!
//! ```text
//! <data_dir>/
//!   <scope>/
//!     index.json        metadata index, keyed by record id
//!     <id>.<ext>        one blob per record
//! ```
//!
//! There is no in-memory cache: every operation re-reads the scope's
//! `index.json`, so the filesystem stays the single authoritative state.
//! Blob names are derived from generated UUIDs, never from client input,
//! which keeps uploads from colliding or escaping the scope directory.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};

pub mod export;
pub mod filter;

/// Name of the per-scope metadata index file
const INDEX_FILE: &str = "index.json";

/// Metadata entry describing one stored audio file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileRecord {
    pub id: Uuid,
    /// Owner namespace; a record never changes scope
    pub scope: String,
    /// Client-supplied name, kept for Content-Disposition on download
    pub filename: String,
    pub content_type: String,
    pub title: String,
    pub artist: String,
    #[serde(default)]
    pub description: String,
    /// Case-normalized, non-empty tag set
    #[serde(default)]
    pub tags: BTreeSet<String>,
    pub size_bytes: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FileRecord {
    /// On-disk blob name: the record id plus the sanitized extension of the
    /// original filename. Client input never reaches the path directly.
    pub fn blob_name(&self) -> String {
        match sanitized_extension(&self.filename) {
            Some(ext) => format!("{}.{}", self.id, ext),
            None => self.id.to_string(),
        }
    }
}

/// Upload metadata validated at the HTTP boundary, before any disk I/O
#[derive(Debug, Clone)]
pub struct NewUpload {
    pub filename: String,
    pub content_type: String,
    pub title: String,
    pub artist: String,
    pub description: String,
    pub tags: BTreeSet<String>,
}

/// Storage adapter over one data root directory.
///
/// The root is injected at construction (no process-wide singleton) so tests
/// can point the whole service at a temporary directory.
pub struct FileStore {
    root: PathBuf,
    /// Serializes index read-modify-write cycles within this process.
    /// Cross-process writers are not guarded.
    index_lock: Mutex<()>,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            index_lock: Mutex::new(()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write a blob and persist its metadata record under a fresh id.
    pub fn put(&self, scope: &str, upload: NewUpload, bytes: &[u8]) -> Result<FileRecord> {
        validate_scope(scope)?;

        let now = Utc::now();
        let record = FileRecord {
            id: Uuid::new_v4(),
            scope: scope.to_string(),
            filename: upload.filename,
            content_type: upload.content_type,
            title: upload.title,
            artist: upload.artist,
            description: upload.description,
            tags: upload.tags,
            size_bytes: bytes.len() as u64,
            created_at: now,
            updated_at: now,
        };

        let dir = self.scope_dir(scope);
        fs::create_dir_all(&dir)
            .map_err(|e| Error::Write(format!("creating {}: {}", dir.display(), e)))?;

        let blob_path = dir.join(record.blob_name());
        fs::write(&blob_path, bytes)
            .map_err(|e| Error::Write(format!("writing {}: {}", blob_path.display(), e)))?;

        let _guard = self.lock_index();
        let mut index = self.read_index(scope)?;
        index.insert(record.id, record.clone());
        self.write_index(scope, &index)?;

        Ok(record)
    }

    /// Fetch a blob and its record; `NotFound` if the id is absent in scope.
    pub fn get(&self, scope: &str, id: Uuid) -> Result<(Vec<u8>, FileRecord)> {
        validate_scope(scope)?;

        let index = self.read_index(scope)?;
        let record = index
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("file {} in scope {}", id, scope)))?;

        let path = self.blob_path(&record);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::NotFound(format!("blob missing on disk for {}", id)));
            }
            Err(e) => return Err(e.into()),
        };

        Ok((bytes, record))
    }

    /// Look up a record without reading the blob.
    pub fn record(&self, scope: &str, id: Uuid) -> Result<FileRecord> {
        validate_scope(scope)?;

        self.read_index(scope)?
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("file {} in scope {}", id, scope)))
    }

    /// Remove a record and its blob. Removing an already-missing blob is
    /// tolerated; an unknown id is `NotFound`.
    pub fn delete(&self, scope: &str, id: Uuid) -> Result<()> {
        validate_scope(scope)?;

        let _guard = self.lock_index();
        let mut index = self.read_index(scope)?;
        let record = index
            .remove(&id)
            .ok_or_else(|| Error::NotFound(format!("file {} in scope {}", id, scope)))?;

        let path = self.blob_path(&record);
        match fs::remove_file(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        self.write_index(scope, &index)
    }

    /// All records for a scope. A scope that has never seen an upload yields
    /// an empty list, not an error. Order is unspecified.
    pub fn list(&self, scope: &str) -> Result<Vec<FileRecord>> {
        validate_scope(scope)?;
        Ok(self.read_index(scope)?.into_values().collect())
    }

    pub fn blob_path(&self, record: &FileRecord) -> PathBuf {
        self.scope_dir(&record.scope).join(record.blob_name())
    }

    /// The lock guards no data of its own, so a poisoned guard (a panic in
    /// another request) is recovered rather than propagated.
    fn lock_index(&self) -> std::sync::MutexGuard<'_, ()> {
        self.index_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn scope_dir(&self, scope: &str) -> PathBuf {
        self.root.join(scope)
    }

    fn index_path(&self, scope: &str) -> PathBuf {
        self.scope_dir(scope).join(INDEX_FILE)
    }

    fn read_index(&self, scope: &str) -> Result<BTreeMap<Uuid, FileRecord>> {
        let path = self.index_path(scope);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_str(&content)?)
    }

    fn write_index(&self, scope: &str, index: &BTreeMap<Uuid, FileRecord>) -> Result<()> {
        let path = self.index_path(scope);
        let json = serde_json::to_vec_pretty(index)?;
        fs::write(&path, json)
            .map_err(|e| Error::Write(format!("writing {}: {}", path.display(), e)))
    }
}

/// Scopes become directory names, so reject anything that could traverse
/// out of the data root.
fn validate_scope(scope: &str) -> Result<()> {
    if scope.is_empty() {
        return Err(Error::Validation("scope must not be empty".into()));
    }
    if scope == "." || scope == ".." {
        return Err(Error::Validation(format!("invalid scope: {}", scope)));
    }
    if scope.contains(['/', '\\', '\0']) {
        return Err(Error::Validation(format!("invalid scope: {}", scope)));
    }
    Ok(())
}

/// Extension of the client filename, lowercased and restricted to short
/// alphanumeric strings. Anything else is treated as no extension.
fn sanitized_extension(filename: &str) -> Option<String> {
    let ext = Path::new(filename).extension()?.to_str()?;
    if ext.is_empty() || ext.len() > 10 || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample_upload(title: &str, tags: &[&str]) -> NewUpload {
        NewUpload {
            filename: format!("{}.mp3", title),
            content_type: "audio/mpeg".to_string(),
            title: title.to_string(),
            artist: "Test Artist".to_string(),
            description: String::new(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }

    #[test]
    fn test_put_then_get_roundtrip() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path());

        let record = store
            .put("alice", sample_upload("song", &["jazz"]), b"audio bytes")
            .unwrap();
        assert_eq!(record.size_bytes, 11);
        assert_eq!(record.scope, "alice");

        let (bytes, fetched) = store.get("alice", record.id).unwrap();
        assert_eq!(bytes, b"audio bytes");
        assert_eq!(fetched, record);
    }

    #[test]
    fn test_get_unknown_id_is_not_found() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path());
        store
            .put("alice", sample_upload("song", &[]), b"x")
            .unwrap();

        let result = store.get("alice", Uuid::new_v4());
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[test]
    fn test_record_not_visible_across_scopes() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path());
        let record = store
            .put("alice", sample_upload("song", &[]), b"x")
            .unwrap();

        let result = store.get("bob", record.id);
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[test]
    fn test_delete_removes_blob_and_record() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path());
        let record = store
            .put("alice", sample_upload("song", &[]), b"x")
            .unwrap();
        let blob = store.blob_path(&record);
        assert!(blob.exists());

        store.delete("alice", record.id).unwrap();
        assert!(!blob.exists());
        assert!(matches!(
            store.get("alice", record.id),
            Err(Error::NotFound(_))
        ));

        // Second delete of the same id reports NotFound
        assert!(matches!(
            store.delete("alice", record.id),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_list_unknown_scope_is_empty() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path());
        assert!(store.list("nobody").unwrap().is_empty());
    }

    #[test]
    fn test_list_returns_all_records() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path());
        store.put("alice", sample_upload("a", &[]), b"1").unwrap();
        store.put("alice", sample_upload("b", &[]), b"2").unwrap();
        store.put("bob", sample_upload("c", &[]), b"3").unwrap();

        let records = store.list("alice").unwrap();
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.scope == "alice"));
    }

    #[test]
    fn test_scope_validation_rejects_traversal() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path());
        for scope in ["", "..", "a/b", "a\\b"] {
            let result = store.list(scope);
            assert!(matches!(result, Err(Error::Validation(_))), "scope {:?}", scope);
        }
    }

    #[test]
    fn test_store_recovers_from_poisoned_lock() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path());

        // Poison the index lock by panicking while holding it
        let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = store.index_lock.lock().unwrap();
            panic!("poisoning the lock");
        }));

        let record = store
            .put("alice", sample_upload("song", &[]), b"x")
            .unwrap();
        assert!(store.get("alice", record.id).is_ok());
        store.delete("alice", record.id).unwrap();
    }

    #[test]
    fn test_blob_name_sanitizes_extension() {
        let mut record = FileRecord {
            id: Uuid::new_v4(),
            scope: "s".into(),
            filename: "../../etc/passwd.MP3".into(),
            content_type: "audio/mpeg".into(),
            title: "t".into(),
            artist: "a".into(),
            description: String::new(),
            tags: BTreeSet::new(),
            size_bytes: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert_eq!(record.blob_name(), format!("{}.mp3", record.id));

        record.filename = "noextension".into();
        assert_eq!(record.blob_name(), record.id.to_string());

        record.filename = "weird.e x t".into();
        assert_eq!(record.blob_name(), record.id.to_string());
    }
}

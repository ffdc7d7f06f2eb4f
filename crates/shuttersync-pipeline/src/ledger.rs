//! Persisted upload ledger (dedup registry)
//!
//! Maps content digests to upload records. An entry whose recorded source
//! path matches the current path means that exact content at that exact path
//! was already durably uploaded and must not be re-uploaded. The ledger is an
//! upload journal, not a live-state mirror: remote deletions never purge
//! entries.
//!
//! A single active process owns the backing file at a time, and only the
//! upload procedure writes it (after a confirmed-successful upload), so no
//! locking beyond the queue's own serialization is needed. Corrupt, missing,
//! or whitespace-only backing storage degrades to an empty ledger and is
//! never fatal.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// One confirmed upload, keyed in the ledger by its content digest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadRecord {
    /// Local path the bytes were uploaded from
    pub source_path: PathBuf,
    /// Location of the object as reported by the server
    pub remote_location: String,
    /// When the upload was confirmed
    pub uploaded_at: DateTime<Utc>,
}

/// File-backed digest-to-record registry
#[derive(Debug, Clone)]
pub struct UploadLedger {
    /// Path of the JSON backing file
    path: PathBuf,
}

impl UploadLedger {
    /// Creates a ledger backed by the given file (which need not exist yet)
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Loads the full mapping from the backing file
    ///
    /// Missing, empty, whitespace-only, or unparseable files all yield an
    /// empty mapping with a logged warning; startup never blocks on ledger
    /// state.
    pub fn load(&self) -> HashMap<String, UploadRecord> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return HashMap::new(),
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "Cannot read upload ledger, treating as empty");
                return HashMap::new();
            }
        };

        if content.trim().is_empty() {
            return HashMap::new();
        }

        match serde_json::from_str(&content) {
            Ok(records) => records,
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "Corrupt upload ledger, treating as empty");
                HashMap::new()
            }
        }
    }

    /// Persists the full mapping to the backing file
    pub fn save(&self, records: &HashMap<String, UploadRecord>) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(records)?;
        std::fs::write(&self.path, json)
    }

    /// Returns true if this digest was already uploaded from this exact path
    ///
    /// The check intentionally includes the path: the same bytes copied to a
    /// different location are treated as a brand-new upload.
    pub fn is_duplicate(&self, digest: &str, source_path: &Path) -> bool {
        self.load()
            .get(digest)
            .map(|record| record.source_path == source_path)
            .unwrap_or(false)
    }

    /// Records a confirmed-successful upload under its content digest
    pub fn register(
        &self,
        digest: &str,
        source_path: &Path,
        remote_location: &str,
    ) -> io::Result<()> {
        let mut records = self.load();
        records.insert(
            digest.to_string(),
            UploadRecord {
                source_path: source_path.to_path_buf(),
                remote_location: remote_location.to_string(),
                uploaded_at: Utc::now(),
            },
        );
        self.save(&records)?;
        debug!(digest, path = %source_path.display(), remote_location, "Registered upload");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ledger_in(dir: &tempfile::TempDir) -> UploadLedger {
        UploadLedger::new(dir.path().join("uploaded_photos.json"))
    }

    #[test]
    fn test_missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(ledger_in(&dir).load().is_empty());
    }

    #[test]
    fn test_whitespace_only_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = ledger_in(&dir);
        std::fs::write(dir.path().join("uploaded_photos.json"), "  \n\t \n").unwrap();
        assert!(ledger.load().is_empty());
    }

    #[test]
    fn test_corrupt_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = ledger_in(&dir);
        std::fs::write(dir.path().join("uploaded_photos.json"), "{not json").unwrap();
        assert!(ledger.load().is_empty());
    }

    #[test]
    fn test_register_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = ledger_in(&dir);

        ledger
            .register("digest-1", Path::new("/photos/a.jpg"), "https://cdn/a.jpg")
            .unwrap();

        let records = ledger.load();
        assert_eq!(records.len(), 1);
        let record = &records["digest-1"];
        assert_eq!(record.source_path, PathBuf::from("/photos/a.jpg"));
        assert_eq!(record.remote_location, "https://cdn/a.jpg");

        // save(load()) is a no-op
        ledger.save(&records).unwrap();
        assert_eq!(ledger.load(), records);
    }

    #[test]
    fn test_duplicate_requires_digest_and_exact_path() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = ledger_in(&dir);
        ledger
            .register("digest-1", Path::new("/photos/a.jpg"), "https://cdn/a.jpg")
            .unwrap();

        assert!(ledger.is_duplicate("digest-1", Path::new("/photos/a.jpg")));
        // Same bytes at a different path are not a duplicate
        assert!(!ledger.is_duplicate("digest-1", Path::new("/photos/copy/a.jpg")));
        // Different bytes at the same path are not a duplicate
        assert!(!ledger.is_duplicate("digest-2", Path::new("/photos/a.jpg")));
    }

    #[test]
    fn test_register_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = UploadLedger::new(dir.path().join("nested/deeper/ledger.json"));
        ledger
            .register("d", Path::new("/photos/a.jpg"), "https://cdn/a.jpg")
            .unwrap();
        assert!(ledger.is_duplicate("d", Path::new("/photos/a.jpg")));
    }
}

//! Local filesystem storage implementation.
//!
//! Writes go to a sibling `.tmp` file which is flushed, synced and renamed
//! over the target, so a crash mid-write leaves the old document readable.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::error::{AppError, Result};
use crate::models::{SEEN_DOCUMENT_VERSION, SeenDocument, SeenRecord};
use crate::storage::SeenStore;

/// Seen record kept in a single JSON file.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    path: PathBuf,
}

impl LocalStorage {
    /// Create a LocalStorage backed by the given file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sibling temp file: the target's file name with `.tmp` appended.
    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    /// Ensure parent directory exists.
    fn ensure_dir(&self) -> std::io::Result<()> {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent),
            _ => Ok(()),
        }
    }

    /// Write bytes atomically (write to temp, then rename).
    fn write_bytes(&self, bytes: &[u8]) -> std::io::Result<()> {
        self.ensure_dir()?;

        let tmp = self.tmp_path();
        let result = (|| {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(bytes)?;
            file.flush()?;
            file.sync_all()?;
            drop(file);
            fs::rename(&tmp, &self.path)
        })();

        if result.is_err() {
            let _ = fs::remove_file(&tmp);
        }
        result
    }

    /// Read bytes, returning None if file doesn't exist.
    fn read_bytes(&self) -> std::io::Result<Option<Vec<u8>>> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }
}

impl SeenStore for LocalStorage {
    fn load(&self) -> SeenRecord {
        let bytes = match self.read_bytes() {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                log::info!(
                    "No seen record at {}, starting fresh",
                    self.path.display()
                );
                return SeenRecord::new();
            }
            Err(e) => {
                log::warn!(
                    "Error reading seen record {}: {}, starting fresh",
                    self.path.display(),
                    e
                );
                return SeenRecord::new();
            }
        };

        match serde_json::from_slice::<SeenDocument>(&bytes) {
            Ok(doc) => {
                if doc.version != SEEN_DOCUMENT_VERSION {
                    log::warn!(
                        "Seen record {} has version {}, expected {}; reading it anyway",
                        self.path.display(),
                        doc.version,
                        SEEN_DOCUMENT_VERSION
                    );
                }
                log::debug!(
                    "Loaded {} seen posts (version {}) from {}",
                    doc.seen_posts.len(),
                    doc.version,
                    self.path.display()
                );
                doc.seen_posts
            }
            Err(e) => {
                log::warn!(
                    "Error loading seen posts from {}: {}, starting fresh",
                    self.path.display(),
                    e
                );
                SeenRecord::new()
            }
        }
    }

    fn persist(&self, record: &SeenRecord) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(&SeenDocument::new(record.clone()))?;
        self.write_bytes(&bytes)
            .map_err(|e| AppError::persist(&self.path, e))?;

        log::debug!(
            "Saved {} seen posts to {}",
            record.len(),
            self.path.display()
        );
        Ok(())
    }
}

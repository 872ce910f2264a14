//! # File Storage
//!
//! Device-local durable store: one file per key inside a directory.
//!
//! ## Layout
//! ```text
//! <data dir>/
//! ├── panierrCartItems.json     ← key "panierrCartItems"
//! └── shop%2Fcart.json          ← key "shop/cart" (escaped)
//! ```
//!
//! Writes go to a uniquely named temp file in the same directory and are
//! renamed over the target, so readers see either the old or the new blob.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{StorageError, StorageResult};
use crate::provider::StorageProvider;

/// Stores each key as `<dir>/<escaped key>.json`.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Opens (and creates if needed) a store rooted at `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> StorageResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| StorageError::io(&dir, e))?;
        debug!(?dir, "file storage opened");
        Ok(FileStorage { dir })
    }

    /// Opens the store in the platform data directory.
    pub fn at_default_location() -> StorageResult<Self> {
        let dir = Self::default_dir().ok_or(StorageError::NoDataDir)?;
        Self::new(dir)
    }

    /// Platform data directory for Panierr, e.g.
    /// `~/.local/share/panierr` on Linux.
    pub fn default_dir() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "panierr", "panierr")
            .map(|dirs| dirs.data_dir().to_path_buf())
    }

    /// Root directory of this store.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File backing `key`.
    pub fn path_for(&self, key: &str) -> StorageResult<PathBuf> {
        if key.is_empty() {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{}.json", escape_key(key))))
    }
}

impl StorageProvider for FileStorage {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::io(path, e)),
        }
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let path = self.path_for(key)?;
        let tmp = self
            .dir
            .join(format!(".{}.tmp", uuid::Uuid::new_v4().simple()));

        fs::write(&tmp, value).map_err(|e| StorageError::io(&tmp, e))?;

        if let Err(e) = fs::rename(&tmp, &path) {
            if let Err(cleanup) = fs::remove_file(&tmp) {
                warn!(?tmp, error = %cleanup, "failed to remove temp file");
            }
            return Err(StorageError::io(path, e));
        }

        debug!(?path, bytes = value.len(), "file storage write");
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::io(path, e)),
        }
    }
}

/// Percent-escapes every byte outside `[A-Za-z0-9_-]`.
fn escape_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    for byte in key.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_' {
            out.push(byte as char);
        } else {
            out.push_str(&format!("%{:02X}", byte));
        }
    }
    out
}

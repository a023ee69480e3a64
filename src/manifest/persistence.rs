//! Persistence layer for the manifest
//!
//! The manifest is a pretty-printed, flat JSON object mapping relative path to
//! hex fingerprint. Saves go to a sibling temp file which is fsynced and
//! renamed over the target, so a crash never leaves a half-written manifest
//! behind.

use crate::error::StorageError;
use crate::manifest::Manifest;
use crate::tree::path::normalize_key;
use crate::types::Fingerprint;
use fs2::FileExt;
use serde::Serialize;
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Loads and saves a manifest at a fixed path.
#[derive(Debug, Clone)]
pub struct ManifestStore {
    path: PathBuf,
}

/// Exclusive advisory lock on a manifest, released on drop.
#[derive(Debug)]
pub struct ManifestLock {
    file: File,
    path: PathBuf,
}

impl ManifestLock {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ManifestLock {
    fn drop(&mut self) {
        let _ = self.file.unlock();
    }
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name: OsString = path.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}

impl ManifestStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Temp file used while saving.
    pub fn temp_path(&self) -> PathBuf {
        with_suffix(&self.path, ".tmp")
    }

    /// Lock file guarding concurrent runs.
    pub fn lock_path(&self) -> PathBuf {
        with_suffix(&self.path, ".lock")
    }

    /// Take the run lock. Fails fast with `StorageError::Locked` if another
    /// process (or another handle in this one) already holds it.
    pub fn lock(&self) -> Result<ManifestLock, StorageError> {
        let lock_path = self.lock_path();
        if let Some(parent) = lock_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| StorageError::io(parent, e))?;
        }
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)
            .map_err(|e| StorageError::io(&lock_path, e))?;

        file.try_lock_exclusive()
            .map_err(|e| lock_error(&self.path, &lock_path, e))?;

        Ok(ManifestLock {
            file,
            path: lock_path,
        })
    }

    /// Load the manifest, or an empty one if none has been saved yet.
    ///
    /// A file that exists but does not parse is an error: the run must not
    /// proceed as if nothing had ever been uploaded.
    pub fn load(&self) -> Result<Manifest, StorageError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No manifest found, starting empty");
                return Ok(Manifest::new());
            }
            Err(e) => return Err(StorageError::io(&self.path, e)),
        };

        let raw: BTreeMap<String, String> =
            serde_json::from_slice(&bytes).map_err(|e| self.corrupt(e.to_string()))?;

        let mut manifest = Manifest::new();
        for (key, value) in raw {
            let normalized = normalize_key(&key);
            if normalized.is_empty() {
                return Err(self.corrupt(format!("empty path key {:?}", key)));
            }
            let fingerprint = Fingerprint::parse(&value)
                .map_err(|reason| self.corrupt(format!("entry {:?}: {}", key, reason)))?;
            if let Some(previous) = manifest.record(normalized.clone(), fingerprint) {
                warn!(
                    key = %normalized,
                    dropped = %previous,
                    "Manifest contains duplicate keys after separator normalization"
                );
            }
        }

        debug!(path = %self.path.display(), entries = manifest.len(), "Loaded manifest");
        Ok(manifest)
    }

    /// Write the full manifest, replacing any previous version atomically.
    pub fn save(&self, manifest: &Manifest) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| StorageError::io(parent, e))?;
        }

        let mut serialized = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut serialized, formatter);
        manifest.serialize(&mut serializer).map_err(|e| {
            StorageError::io(&self.path, std::io::Error::new(ErrorKind::InvalidData, e))
        })?;
        serialized.push(b'\n');

        let temp_path = self.temp_path();
        let write_result = (|| -> std::io::Result<()> {
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&temp_path)?;
            file.write_all(&serialized)?;
            file.sync_all()
        })();
        if let Err(e) = write_result {
            let _ = fs::remove_file(&temp_path);
            return Err(StorageError::io(&temp_path, e));
        }

        fs::rename(&temp_path, &self.path).map_err(|e| {
            let _ = fs::remove_file(&temp_path);
            StorageError::io(&self.path, e)
        })?;

        debug!(path = %self.path.display(), entries = manifest.len(), "Saved manifest");
        Ok(())
    }

    fn corrupt(&self, reason: String) -> StorageError {
        StorageError::ManifestCorrupt {
            path: self.path.clone(),
            reason,
        }
    }
}

/// Only contention means another run holds the lock; anything else is a
/// filesystem problem (no lock support, ENOLCK) and is reported as such.
fn lock_error(manifest: &Path, lock_path: &Path, error: std::io::Error) -> StorageError {
    if is_contended(&error) {
        StorageError::Locked(manifest.to_path_buf())
    } else {
        StorageError::io(lock_path, error)
    }
}

fn is_contended(error: &std::io::Error) -> bool {
    error.kind() == ErrorKind::WouldBlock
        || error.raw_os_error() == fs2::lock_contended_error().raw_os_error()
}

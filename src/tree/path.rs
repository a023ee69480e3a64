//! Manifest key computation and normalization
//!
//! Manifest keys are always relative to the sync root, use `/` as the only
//! separator, and are Unicode NFC-normalized, so a manifest written on one
//! platform is read identically on another.

use crate::error::StorageError;
use std::path::{Component, Path, PathBuf};
use unicode_normalization::UnicodeNormalization;

/// Canonicalize the sync root for stable prefix stripping.
pub fn canonicalize_root(root: &Path) -> Result<PathBuf, StorageError> {
    dunce::canonicalize(root).map_err(|e| StorageError::io(root, e))
}

/// Compute the manifest key for `path` beneath `root`.
///
/// `path` must lie under `root`; both are expected to share the same
/// canonical form (the walker yields paths prefixed by the root it was given).
pub fn relative_key(root: &Path, path: &Path) -> Result<String, StorageError> {
    let relative = path.strip_prefix(root).map_err(|_| {
        StorageError::InvalidPath(format!("{:?} is not under sync root {:?}", path, root))
    })?;

    let mut parts = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(name) => parts.push(name.to_string_lossy().nfc().collect::<String>()),
            Component::CurDir => {}
            other => {
                return Err(StorageError::InvalidPath(format!(
                    "unexpected component {:?} in {:?}",
                    other, relative
                )))
            }
        }
    }

    if parts.is_empty() {
        return Err(StorageError::InvalidPath(format!(
            "{:?} is the sync root itself",
            path
        )));
    }

    Ok(parts.join("/"))
}

/// Normalize a key read from a persisted manifest.
///
/// Rewrites `\` separators to `/`, drops `.` and empty segments, and applies NFC.
pub fn normalize_key(key: &str) -> String {
    let normalized: String = key.nfc().collect();
    normalized
        .replace('\\', "/")
        .split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect::<Vec<_>>()
        .join("/")
}

//! Error types for hashsync.

use std::path::PathBuf;
use thiserror::Error;

/// Local storage errors: fingerprinting, walking, and the manifest file.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to walk directory: {0}")]
    Walk(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Manifest {path:?} is corrupt: {reason}. Fix or remove it before syncing again.")]
    ManifestCorrupt { path: PathBuf, reason: String },

    #[error("Manifest {0:?} is locked by another hashsync run")]
    Locked(PathBuf),
}

impl StorageError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StorageError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Errors raised at the remote storage boundary.
#[derive(Debug, Error)]
pub enum TransferError {
    #[error("Authorization failed: {0}")]
    Unauthorized(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Quota or size limit exceeded: {0}")]
    Quota(String),

    #[error("Upload rejected: {0}")]
    Rejected(String),

    #[error("Transfer I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TransferError {
    /// Authorization failures abort a run regardless of failure policy.
    pub fn is_fatal(&self) -> bool {
        matches!(self, TransferError::Unauthorized(_))
    }
}

/// Top-level error for a sync run and the CLI.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Transfer error: {0}")]
    Transfer(#[from] TransferError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Sync finished with {0} failed file(s)")]
    PartialFailure(usize),
}

impl From<config::ConfigError> for SyncError {
    fn from(err: config::ConfigError) -> Self {
        SyncError::Config(err.to_string())
    }
}

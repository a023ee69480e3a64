//! Shared test utilities for integration tests
//!
//! A scriptable in-memory transfer client plus helpers for laying out sync
//! roots and manifests in temp directories.

use async_trait::async_trait;
use hashsync::config::SyncConfig;
use hashsync::error::TransferError;
use hashsync::manifest::{Manifest, ManifestStore};
use hashsync::transfer::TransferClient;
use hashsync::types::RemoteObjectId;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::TempDir;

/// How a scripted upload call should fail.
#[derive(Debug, Clone, Copy)]
pub enum Failure {
    Network,
    Quota,
    Unauthorized,
}

impl Failure {
    fn to_error(self) -> TransferError {
        match self {
            Failure::Network => TransferError::Network("connection reset".to_string()),
            Failure::Quota => TransferError::Quota("storage full".to_string()),
            Failure::Unauthorized => TransferError::Unauthorized("token revoked".to_string()),
        }
    }
}

/// Records every upload and fails the calls it was scripted to fail.
#[derive(Default)]
pub struct MockTransfer {
    uploads: Mutex<Vec<String>>,
    calls: Mutex<usize>,
    fail_on: Vec<(usize, Failure)>,
}

impl MockTransfer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the `call`-th upload (1-based) with `failure`.
    pub fn failing_on(call: usize, failure: Failure) -> Self {
        Self {
            fail_on: vec![(call, failure)],
            ..Self::default()
        }
    }

    /// File names uploaded successfully, in order.
    pub fn uploaded(&self) -> Vec<String> {
        self.uploads.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl TransferClient for MockTransfer {
    async fn upload(
        &self,
        local_path: &Path,
        destination: &str,
    ) -> Result<RemoteObjectId, TransferError> {
        let call = {
            let mut calls = self.calls.lock().unwrap();
            *calls += 1;
            *calls
        };
        if let Some((_, failure)) = self.fail_on.iter().find(|(n, _)| *n == call) {
            return Err(failure.to_error());
        }

        let name = local_path
            .file_name()
            .unwrap()
            .to_string_lossy()
            .into_owned();
        self.uploads.lock().unwrap().push(name.clone());
        Ok(RemoteObjectId(format!("{}:{}:{}", destination, call, name)))
    }

    fn backend_name(&self) -> &str {
        "mock"
    }
}

/// A sync root and a separate state directory for the manifest.
pub struct Fixture {
    pub root: TempDir,
    pub state: TempDir,
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            root: TempDir::new().unwrap(),
            state: TempDir::new().unwrap(),
        }
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.state.path().join("file_metadata.json")
    }

    pub fn config(&self) -> SyncConfig {
        SyncConfig::new(
            self.root.path().to_path_buf(),
            "drive-folder".to_string(),
            self.manifest_path(),
        )
    }

    pub fn write(&self, relative: &str, contents: &str) {
        let path = self.root.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, contents).unwrap();
    }

    pub fn remove(&self, relative: &str) {
        fs::remove_file(self.root.path().join(relative)).unwrap();
    }

    pub fn manifest(&self) -> Manifest {
        ManifestStore::new(self.manifest_path()).load().unwrap()
    }

    pub fn manifest_exists(&self) -> bool {
        self.manifest_path().exists()
    }
}

/// Uploaded file names, sorted, for order-independent comparisons.
pub fn sorted(mut names: Vec<String>) -> Vec<String> {
    names.sort();
    names
}

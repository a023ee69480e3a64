//! Plan and report types for a sync run.

use crate::manifest::ChangeKind;
use crate::types::{Fingerprint, RemoteObjectId};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

/// A file that needs uploading, as found by a plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedUpload {
    pub relative_path: String,
    pub absolute_path: PathBuf,
    pub fingerprint: Fingerprint,
    pub change: ChangeKind,
    pub size: u64,
}

/// A file that could not be processed under the skip failure policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedFile {
    pub relative_path: String,
    pub error: String,
}

/// Result of comparing the sync root against the manifest, without uploading.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncPlan {
    pub uploads: Vec<PlannedUpload>,
    pub unchanged: usize,
    pub failed: Vec<FailedFile>,
    /// Manifest entries with no file under the root. Kept, never pruned.
    pub stale: Vec<String>,
}

impl SyncPlan {
    pub fn is_clean(&self) -> bool {
        self.uploads.is_empty() && self.failed.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedFile {
    pub relative_path: String,
    pub fingerprint: Fingerprint,
    pub change: ChangeKind,
    pub remote_id: RemoteObjectId,
}

/// Outcome of a completed run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncReport {
    pub uploaded: Vec<UploadedFile>,
    pub unchanged: usize,
    pub failed: Vec<FailedFile>,
    pub manifest_saved: bool,
}

impl SyncReport {
    pub fn uploaded_paths(&self) -> Vec<&str> {
        self.uploaded
            .iter()
            .map(|u| u.relative_path.as_str())
            .collect()
    }
}

/// Per-file progress, emitted as the run advances.
#[derive(Debug, Clone)]
pub enum SyncEvent {
    ChangeDetected {
        relative_path: String,
        change: ChangeKind,
    },
    Uploaded(UploadedFile),
    Skipped(FailedFile),
}

/// Callback receiving [`SyncEvent`]s.
pub type ProgressSink = Arc<dyn Fn(&SyncEvent) + Send + Sync>;

//! Sync reconciliation
//!
//! The [`Reconciler`] walks the sync root, fingerprints each file, compares it
//! against the manifest, uploads what changed, and persists the manifest.
//!
//! Two policies shape a run:
//!
//! - [`PersistencePolicy`]: `Batch` saves the manifest once, after every file
//!   has been considered. An aborted run therefore forgets the uploads it did
//!   perform and the next run repeats them. `Incremental` saves after every
//!   successful upload instead.
//! - [`FailurePolicy`]: `Abort` stops at the first fingerprint or transfer
//!   error. `Skip` records the failure, leaves that file's manifest
//!   entry untouched, and moves on. Authorization failures abort either way.
//!
//! Only one run may use a given manifest at a time; the manifest lock turns a
//! second concurrent run into an immediate error.

pub mod reconciler;
pub mod report;

pub use reconciler::Reconciler;
pub use report::{FailedFile, PlannedUpload, ProgressSink, SyncEvent, SyncPlan, SyncReport, UploadedFile};

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// When the manifest is written during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PersistencePolicy {
    /// Save once at the end of the run.
    #[default]
    Batch,
    /// Save after each successful upload, then once more at the end.
    Incremental,
}

impl PersistencePolicy {
    pub fn name(&self) -> &'static str {
        match self {
            PersistencePolicy::Batch => "batch",
            PersistencePolicy::Incremental => "incremental",
        }
    }
}

impl FromStr for PersistencePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "batch" => Ok(PersistencePolicy::Batch),
            "incremental" => Ok(PersistencePolicy::Incremental),
            other => Err(format!(
                "unknown persistence policy '{}' (expected 'batch' or 'incremental')",
                other
            )),
        }
    }
}

/// What a per-file error does to the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    #[default]
    Abort,
    #[serde(alias = "skip_and_report")]
    Skip,
}

impl FailurePolicy {
    pub fn name(&self) -> &'static str {
        match self {
            FailurePolicy::Abort => "abort",
            FailurePolicy::Skip => "skip",
        }
    }
}

impl FromStr for FailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "abort" => Ok(FailurePolicy::Abort),
            "skip" | "skip_and_report" => Ok(FailurePolicy::Skip),
            other => Err(format!(
                "unknown failure policy '{}' (expected 'abort' or 'skip')",
                other
            )),
        }
    }
}

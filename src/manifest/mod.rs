//! Manifest: the last uploaded fingerprint for every tracked relative path.
//!
//! Keys are root-relative, `/`-separated manifest keys (see `tree::path`).
//! Absence of a key means the file was never uploaded, or its upload was not
//! recorded because the run that performed it never saved. Entries are never
//! pruned: a file deleted from the sync root keeps its entry indefinitely.

pub mod persistence;

pub use persistence::{ManifestLock, ManifestStore};

use crate::types::Fingerprint;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Why a file needs uploading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    /// No manifest entry for this path.
    New,
    /// Manifest entry exists with a different fingerprint.
    Modified,
}

impl ChangeKind {
    pub fn label(&self) -> &'static str {
        match self {
            ChangeKind::New => "new",
            ChangeKind::Modified => "modified",
        }
    }
}

/// In-memory manifest. Ordered so the persisted form diffs cleanly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Manifest {
    entries: BTreeMap<String, Fingerprint>,
}

impl Manifest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Fingerprint> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Record the fingerprint for `key`, returning the previous one.
    pub fn record(&mut self, key: impl Into<String>, fingerprint: Fingerprint) -> Option<Fingerprint> {
        self.entries.insert(key.into(), fingerprint)
    }

    /// Compare a freshly computed fingerprint against the recorded one.
    ///
    /// Returns `None` when the file is unchanged relative to the last save.
    pub fn classify(&self, key: &str, current: &Fingerprint) -> Option<ChangeKind> {
        match self.entries.get(key) {
            None => Some(ChangeKind::New),
            Some(recorded) if recorded != current => Some(ChangeKind::Modified),
            Some(_) => None,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Fingerprint)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl FromIterator<(String, Fingerprint)> for Manifest {
    fn from_iter<I: IntoIterator<Item = (String, Fingerprint)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

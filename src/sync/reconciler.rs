//! Reconciler: decides which files changed since the last saved manifest and
//! drives their upload.

use super::report::{
    FailedFile, PlannedUpload, ProgressSink, SyncEvent, SyncPlan, SyncReport, UploadedFile,
};
use super::{FailurePolicy, PersistencePolicy};
use crate::config::SyncConfig;
use crate::error::{StorageError, SyncError};
use crate::manifest::{Manifest, ManifestStore};
use crate::transfer::{Authorizer, TransferClient};
use crate::tree::hasher::fingerprint_file;
use crate::tree::path::{canonicalize_root, relative_key};
use crate::tree::walker::{FileEntry, Walker, WalkerConfig};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct Reconciler {
    config: SyncConfig,
    store: ManifestStore,
    progress: Option<ProgressSink>,
}

impl Reconciler {
    pub fn new(config: SyncConfig) -> Self {
        let store = ManifestStore::new(config.manifest_path.clone());
        Self {
            config,
            store,
            progress: None,
        }
    }

    /// Receive a [`SyncEvent`] for every detected change, upload and skip.
    pub fn with_progress(mut self, sink: ProgressSink) -> Self {
        self.progress = Some(sink);
        self
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn store(&self) -> &ManifestStore {
        &self.store
    }

    /// Compare the sync root against the saved manifest without uploading
    /// or saving anything.
    pub fn plan(&self) -> Result<SyncPlan, SyncError> {
        let manifest = self.store.load()?;
        let root = canonicalize_root(&self.config.root)?;
        let files = self.walker(&root).walk()?;

        let mut plan = SyncPlan::default();
        let mut seen = HashSet::new();
        for entry in files {
            let key = relative_key(&root, &entry.path)?;
            seen.insert(key.clone());
            match self.inspect(&manifest, key.clone(), &entry) {
                Ok(Some(planned)) => plan.uploads.push(planned),
                Ok(None) => plan.unchanged += 1,
                Err(e) => match self.config.on_error {
                    FailurePolicy::Abort => return Err(e.into()),
                    FailurePolicy::Skip => plan.failed.push(FailedFile {
                        relative_path: key,
                        error: e.to_string(),
                    }),
                },
            }
        }

        plan.stale = manifest
            .iter()
            .filter(|(key, _)| !seen.contains(*key))
            .map(|(key, _)| key.to_string())
            .collect();
        Ok(plan)
    }

    /// Run a full sync: authorize, load the manifest, upload every new or
    /// modified file, then save the manifest.
    ///
    /// Under [`FailurePolicy::Abort`] the first error returns immediately. With
    /// [`PersistencePolicy::Batch`] that means the manifest is not saved and
    /// uploads already done in this run will be repeated next time.
    pub async fn run(&self, authorizer: &dyn Authorizer) -> Result<SyncReport, SyncError> {
        let client = authorizer.authorize().await?;
        info!(
            backend = client.backend_name(),
            destination = %self.config.destination,
            persistence = self.config.persistence.name(),
            on_error = self.config.on_error.name(),
            "Authorized transfer client"
        );
        self.run_with_client(client).await
    }

    /// Run with an already-authorized client.
    pub async fn run_with_client(
        &self,
        client: Arc<dyn TransferClient>,
    ) -> Result<SyncReport, SyncError> {
        let _lock = self.store.lock()?;
        let mut manifest = self.store.load()?;
        let root = canonicalize_root(&self.config.root)?;
        let files = self.walker(&root).walk()?;
        info!(
            root = %root.display(),
            files = files.len(),
            tracked = manifest.len(),
            "Starting sync"
        );

        let mut report = SyncReport::default();
        for entry in files {
            let key = relative_key(&root, &entry.path)?;

            let planned = match self.inspect(&manifest, key.clone(), &entry) {
                Ok(Some(planned)) => planned,
                Ok(None) => {
                    report.unchanged += 1;
                    continue;
                }
                Err(e) => {
                    self.skip_or_abort(&mut report, key, e.into())?;
                    continue;
                }
            };

            self.emit(SyncEvent::ChangeDetected {
                relative_path: planned.relative_path.clone(),
                change: planned.change,
            });

            match client
                .upload(&planned.absolute_path, &self.config.destination)
                .await
            {
                Ok(remote_id) => {
                    info!(
                        path = %planned.relative_path,
                        change = planned.change.label(),
                        fingerprint = planned.fingerprint.short(),
                        remote_id = %remote_id,
                        "Uploaded file"
                    );
                    manifest.record(planned.relative_path.clone(), planned.fingerprint.clone());
                    if self.config.persistence == PersistencePolicy::Incremental {
                        self.store.save(&manifest)?;
                    }
                    let uploaded = UploadedFile {
                        relative_path: planned.relative_path,
                        fingerprint: planned.fingerprint,
                        change: planned.change,
                        remote_id,
                    };
                    self.emit(SyncEvent::Uploaded(uploaded.clone()));
                    report.uploaded.push(uploaded);
                }
                Err(e) if e.is_fatal() => return Err(e.into()),
                Err(e) => self.skip_or_abort(&mut report, planned.relative_path, e.into())?,
            }
        }

        self.store.save(&manifest)?;
        report.manifest_saved = true;
        info!(
            uploaded = report.uploaded.len(),
            unchanged = report.unchanged,
            failed = report.failed.len(),
            manifest = %self.store.path().display(),
            "Sync completed"
        );
        Ok(report)
    }

    /// Fingerprint one file and compare it with its manifest entry.
    fn inspect(
        &self,
        manifest: &Manifest,
        key: String,
        entry: &FileEntry,
    ) -> Result<Option<PlannedUpload>, StorageError> {
        let fingerprint = fingerprint_file(&entry.path, self.config.algorithm)?;
        match manifest.classify(&key, &fingerprint) {
            Some(change) => Ok(Some(PlannedUpload {
                relative_path: key,
                absolute_path: entry.path.clone(),
                fingerprint,
                change,
                size: entry.size,
            })),
            None => {
                debug!(path = %key, "Unchanged");
                Ok(None)
            }
        }
    }

    fn skip_or_abort(
        &self,
        report: &mut SyncReport,
        relative_path: String,
        error: SyncError,
    ) -> Result<(), SyncError> {
        if self.config.on_error == FailurePolicy::Abort {
            return Err(error);
        }
        warn!(path = %relative_path, error = %error, "Skipping file");
        let failed = FailedFile {
            relative_path,
            error: error.to_string(),
        };
        self.emit(SyncEvent::Skipped(failed.clone()));
        report.failed.push(failed);
        Ok(())
    }

    fn emit(&self, event: SyncEvent) {
        if let Some(sink) = &self.progress {
            sink(&event);
        }
    }

    fn walker(&self, root: &Path) -> Walker {
        let excluded_paths = [
            self.store.path().to_path_buf(),
            self.store.temp_path(),
            self.store.lock_path(),
        ]
        .iter()
        .chain(self.config.exclude.iter())
        .map(|p| absolutize(p))
        .collect();

        Walker::with_config(
            root.to_path_buf(),
            WalkerConfig {
                follow_symlinks: self.config.follow_symlinks,
                ignore_patterns: self.config.ignore.clone(),
                excluded_paths,
            },
        )
    }
}

/// Resolve `path` through its canonical parent so it compares equal to
/// walker output, even when the file itself does not exist yet.
fn absolutize(path: &Path) -> PathBuf {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    match (dunce::canonicalize(parent), path.file_name()) {
        (Ok(parent), Some(name)) => parent.join(name),
        _ => path.to_path_buf(),
    }
}

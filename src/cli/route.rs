//! CLI route: run context and the single route table. Dispatches to the
//! reconciler and presentation.

use crate::cli::parse::{Commands, ManifestCommands};
use crate::cli::presentation::{
    format_fingerprint, format_manifest_json, format_manifest_text, format_plan_json,
    format_plan_text, format_report_text, format_sync_event,
};
use crate::config::{ConfigLoader, HashsyncConfig};
use crate::error::SyncError;
use crate::logging::log_file_path;
use crate::manifest::ManifestStore;
use crate::sync::{FailurePolicy, PersistencePolicy, ProgressSink, Reconciler, SyncEvent};
use crate::transfer::auth::TokenCache;
use crate::transfer::build_authorizer;
use crate::tree::hasher::fingerprint_file;
use crate::types::FingerprintAlgorithm;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// Runtime context for CLI execution: working directory and loaded config.
/// Built from the working directory and optional config path using ConfigLoader only.
pub struct RunContext {
    working_dir: PathBuf,
    config: HashsyncConfig,
}

impl RunContext {
    pub fn new(working_dir: PathBuf, config_path: Option<PathBuf>) -> Result<Self, SyncError> {
        let config = if let Some(ref cfg_path) = config_path {
            ConfigLoader::load_from_file(cfg_path)?
        } else {
            ConfigLoader::load(&working_dir)?
        };
        Ok(Self::from_config(working_dir, config))
    }

    /// Build from an already-loaded config. Relative paths resolve against `working_dir`.
    pub fn from_config(working_dir: PathBuf, mut config: HashsyncConfig) -> Self {
        config.sync.root = resolve(&working_dir, &config.sync.root);
        config.sync.manifest_path = resolve(&working_dir, &config.sync.manifest_path);
        config.transfer.http.token_path = resolve(&working_dir, &config.transfer.http.token_path);
        if let Some(base) = config.transfer.directory.base.take() {
            config.transfer.directory.base = Some(resolve(&working_dir, &base));
        }
        config.sync.exclude = config
            .sync
            .exclude
            .iter()
            .map(|p| resolve(&working_dir, p))
            .collect();

        // Credentials and logs must never be uploaded, even when they live in the root
        let cache = TokenCache::new(config.transfer.http.token_path.clone(), None);
        config.sync.exclude.push(cache.path().to_path_buf());
        config.sync.exclude.push(cache.temp_path());
        if let Some(log_file) = log_file_path(&config.logging) {
            config.sync.exclude.push(resolve(&working_dir, &log_file));
        }

        Self {
            working_dir,
            config,
        }
    }

    /// Keep `path` out of every walk, e.g. a log file chosen on the command line.
    pub fn exclude(mut self, path: &Path) -> Self {
        let path = resolve(&self.working_dir, path);
        self.config.sync.exclude.push(path);
        self
    }

    /// Apply `--root`, `--destination` and `--manifest`.
    pub fn with_overrides(
        mut self,
        root: Option<PathBuf>,
        destination: Option<String>,
        manifest: Option<PathBuf>,
    ) -> Self {
        if let Some(root) = root {
            self.config.sync.root = resolve(&self.working_dir, &root);
        }
        if let Some(destination) = destination {
            self.config.sync.destination = destination;
        }
        if let Some(manifest) = manifest {
            self.config.sync.manifest_path = resolve(&self.working_dir, &manifest);
        }
        self
    }

    pub fn config(&self) -> &HashsyncConfig {
        &self.config
    }

    /// Execute a CLI command via the single route table.
    pub fn execute(&self, command: &Commands) -> Result<String, SyncError> {
        match command {
            Commands::Sync {
                dry_run,
                incremental,
                skip_errors,
            } => self.handle_sync(*dry_run, *incremental, *skip_errors),
            Commands::Status { format } => self.handle_status(format),
            Commands::Hash { path, algorithm } => self.handle_hash(path, algorithm.as_deref()),
            Commands::Manifest { command } => match command {
                ManifestCommands::Show { format } => self.handle_manifest_show(format),
            },
        }
    }

    fn handle_sync(
        &self,
        dry_run: bool,
        incremental: bool,
        skip_errors: bool,
    ) -> Result<String, SyncError> {
        let mut config = self.config.clone();
        if incremental {
            config.sync.persistence = PersistencePolicy::Incremental;
        }
        if skip_errors {
            config.sync.on_error = FailurePolicy::Skip;
        }

        if dry_run {
            let plan = Reconciler::new(config.sync).plan()?;
            return Ok(format_plan_text(&plan));
        }

        let config = config.validated()?;
        let authorizer = build_authorizer(&config.transfer)?;
        let sink: ProgressSink = Arc::new(|event: &SyncEvent| {
            println!("{}", format_sync_event(event));
        });
        let reconciler = Reconciler::new(config.sync).with_progress(sink);

        let rt = tokio::runtime::Runtime::new()
            .map_err(|e| SyncError::Config(format!("Failed to create runtime: {}", e)))?;
        let report = rt.block_on(reconciler.run(authorizer.as_ref()))?;

        info!(
            uploaded = report.uploaded.len(),
            failed = report.failed.len(),
            "Sync command finished"
        );
        if !report.failed.is_empty() {
            println!("{}", format_report_text(&report));
            return Err(SyncError::PartialFailure(report.failed.len()));
        }
        Ok(format_report_text(&report))
    }

    fn handle_status(&self, format: &str) -> Result<String, SyncError> {
        let plan = Reconciler::new(self.config.sync.clone()).plan()?;
        match format {
            "json" => format_plan_json(&plan),
            "text" => Ok(format_plan_text(&plan)),
            other => Err(invalid_format(other)),
        }
    }

    fn handle_hash(&self, path: &Path, algorithm: Option<&str>) -> Result<String, SyncError> {
        let algorithm = match algorithm {
            Some(name) => name.parse::<FingerprintAlgorithm>().map_err(SyncError::Config)?,
            None => self.config.sync.algorithm,
        };
        let path = resolve(&self.working_dir, path);
        let fingerprint = fingerprint_file(&path, algorithm)?;
        Ok(format_fingerprint(&fingerprint, algorithm.name(), &path))
    }

    fn handle_manifest_show(&self, format: &str) -> Result<String, SyncError> {
        let store = ManifestStore::new(self.config.sync.manifest_path.clone());
        let manifest = store.load()?;
        match format {
            "json" => format_manifest_json(&manifest),
            "text" => Ok(format_manifest_text(&manifest, store.path())),
            other => Err(invalid_format(other)),
        }
    }
}

fn resolve(working_dir: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        working_dir.join(path)
    }
}

fn invalid_format(format: &str) -> SyncError {
    SyncError::Config(format!(
        "Invalid format: {} (must be 'text' or 'json')",
        format
    ))
}

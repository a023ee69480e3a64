//! Configuration System
//!
//! Layered configuration for hashsync. Sources, lowest precedence first:
//! built-in defaults, the user's global config file, `./hashsync.toml` in the
//! working directory (or an explicit `--config` file), `HASHSYNC__*`
//! environment variables, and finally CLI flags applied by the caller.

use crate::error::SyncError;
use crate::logging::LoggingConfig;
use crate::sync::{FailurePolicy, PersistencePolicy};
use crate::types::FingerprintAlgorithm;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

mod facade;
mod merge;
mod sources;

pub use facade::ConfigLoader;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HashsyncConfig {
    #[serde(default)]
    pub sync: SyncConfig,

    #[serde(default)]
    pub transfer: TransferConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Everything the reconciler needs for one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Local directory tree to sync
    #[serde(default = "default_root")]
    pub root: PathBuf,

    /// Remote container id uploads land in
    #[serde(default)]
    pub destination: String,

    /// Manifest file location
    #[serde(default = "default_manifest_path")]
    pub manifest_path: PathBuf,

    #[serde(default)]
    pub algorithm: FingerprintAlgorithm,

    #[serde(default)]
    pub persistence: PersistencePolicy,

    #[serde(default)]
    pub on_error: FailurePolicy,

    #[serde(default)]
    pub follow_symlinks: bool,

    /// Path component names skipped by the walker
    #[serde(default)]
    pub ignore: Vec<String>,

    /// Files never synced, such as the token cache or a log file inside the root
    #[serde(default)]
    pub exclude: Vec<PathBuf>,
}

fn default_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_manifest_path() -> PathBuf {
    PathBuf::from(".hashsync/manifest.json")
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            destination: String::new(),
            manifest_path: default_manifest_path(),
            algorithm: FingerprintAlgorithm::default(),
            persistence: PersistencePolicy::default(),
            on_error: FailurePolicy::default(),
            follow_symlinks: false,
            ignore: Vec::new(),
            exclude: Vec::new(),
        }
    }
}

impl SyncConfig {
    /// Config with default policies for the given root, destination and manifest.
    pub fn new(root: PathBuf, destination: String, manifest_path: PathBuf) -> Self {
        Self {
            root,
            destination,
            manifest_path,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.destination.trim().is_empty() {
            return Err("destination must be set (sync.destination or --destination)".to_string());
        }
        if !self.root.is_dir() {
            return Err(format!("root {} is not a directory", self.root.display()));
        }
        if self.manifest_path.as_os_str().is_empty() {
            return Err("manifest path cannot be empty".to_string());
        }
        if self.manifest_path.is_dir() {
            return Err(format!(
                "manifest path {} is a directory",
                self.manifest_path.display()
            ));
        }
        Ok(())
    }
}

/// Which transfer backend to authorize against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    Directory,
    Http,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransferConfig {
    #[serde(default)]
    pub backend: BackendKind,

    #[serde(default)]
    pub directory: DirectoryBackendConfig,

    #[serde(default)]
    pub http: HttpBackendConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DirectoryBackendConfig {
    /// Directory holding one sub-directory per destination container
    pub base: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpBackendConfig {
    /// Storage API base URL
    pub endpoint: Option<String>,

    /// Cached credentials file
    #[serde(default = "default_token_path")]
    pub token_path: PathBuf,

    /// Refresh-token grant endpoint
    pub token_endpoint: Option<String>,

    pub client_id: Option<String>,
}

fn default_token_path() -> PathBuf {
    PathBuf::from(".hashsync/token.json")
}

impl Default for HttpBackendConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            token_path: default_token_path(),
            token_endpoint: None,
            client_id: None,
        }
    }
}

impl TransferConfig {
    pub fn validate(&self) -> Result<(), String> {
        match self.backend {
            BackendKind::Directory => {
                if self.directory.base.is_none() {
                    return Err(
                        "transfer.directory.base must be set for the directory backend".to_string(),
                    );
                }
            }
            BackendKind::Http => {
                let endpoint = self.http.endpoint.as_deref().unwrap_or("");
                if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
                    return Err(format!(
                        "transfer.http.endpoint must be an http(s) URL, got '{}'",
                        endpoint
                    ));
                }
            }
        }
        Ok(())
    }
}

/// Configuration validation errors
#[derive(Debug, Clone)]
pub enum ValidationError {
    Sync(String),
    Transfer(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Sync(msg) => write!(f, "sync: {}", msg),
            ValidationError::Transfer(msg) => write!(f, "transfer: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl HashsyncConfig {
    /// Validate the sections needed for an upload run.
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(e) = self.sync.validate() {
            errors.push(ValidationError::Sync(e));
        }
        if let Err(e) = self.transfer.validate() {
            errors.push(ValidationError::Transfer(e));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Validate and fold all problems into one error.
    pub fn validated(self) -> Result<Self, SyncError> {
        self.validate().map_err(|errors| {
            let msgs: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            SyncError::Config(format!(
                "Configuration validation failed:\n{}",
                msgs.join("\n")
            ))
        })?;
        Ok(self)
    }
}

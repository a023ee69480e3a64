//! Remote Storage Boundary
//!
//! The reconciler only ever sees two capabilities: an [`Authorizer`] that
//! yields a usable client (or fails fatally), and a [`TransferClient`] that
//! uploads one local file into a destination container and returns the id the
//! remote side assigned. Uploads land flat in the container, named by the
//! file's basename; the remote side does not mirror sub-directories.

use crate::config::{BackendKind, TransferConfig};
use crate::error::{SyncError, TransferError};
use crate::types::RemoteObjectId;
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

pub mod auth;
pub mod directory;
pub mod http;

pub use directory::{DirectoryAuthorizer, DirectoryBackend};
pub use http::{HttpAuthorizer, HttpBackend};

/// Uploads local files to remote storage.
#[async_trait]
pub trait TransferClient: Send + Sync {
    /// Push the bytes at `local_path` into the container `destination`.
    async fn upload(
        &self,
        local_path: &Path,
        destination: &str,
    ) -> Result<RemoteObjectId, TransferError>;

    /// Short backend name for logs.
    fn backend_name(&self) -> &str;
}

/// Produces an authorized transfer client.
#[async_trait]
pub trait Authorizer: Send + Sync {
    async fn authorize(&self) -> Result<Arc<dyn TransferClient>, TransferError>;
}

/// Authorizer that hands out an already-constructed client.
pub struct StaticAuthorizer {
    client: Arc<dyn TransferClient>,
}

impl StaticAuthorizer {
    pub fn new(client: Arc<dyn TransferClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Authorizer for StaticAuthorizer {
    async fn authorize(&self) -> Result<Arc<dyn TransferClient>, TransferError> {
        Ok(Arc::clone(&self.client))
    }
}

/// Build the authorizer for the configured backend.
pub fn build_authorizer(config: &TransferConfig) -> Result<Arc<dyn Authorizer>, SyncError> {
    match config.backend {
        BackendKind::Directory => {
            let base = config.directory.base.clone().ok_or_else(|| {
                SyncError::Config("transfer.directory.base is not set".to_string())
            })?;
            Ok(Arc::new(DirectoryAuthorizer::new(base)))
        }
        BackendKind::Http => {
            let endpoint = config.http.endpoint.clone().ok_or_else(|| {
                SyncError::Config("transfer.http.endpoint is not set".to_string())
            })?;
            let refresh = config
                .http
                .token_endpoint
                .clone()
                .map(|token_endpoint| auth::RefreshSettings {
                    token_endpoint,
                    client_id: config.http.client_id.clone(),
                });
            Ok(Arc::new(HttpAuthorizer::new(
                endpoint,
                config.http.token_path.clone(),
                refresh,
            )))
        }
    }
}

/// Remote object name for a local file: its basename.
pub(crate) fn object_name(local_path: &Path) -> Result<String, TransferError> {
    local_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| TransferError::Rejected(format!("{:?} has no file name", local_path)))
}

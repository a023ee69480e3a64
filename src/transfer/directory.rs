//! Directory backend: a local or mounted directory stands in for the remote
//! store. Each destination id is a sub-directory of the base.

use super::{object_name, Authorizer, TransferClient};
use crate::error::TransferError;
use crate::types::RemoteObjectId;
use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

pub struct DirectoryBackend {
    base: PathBuf,
}

impl DirectoryBackend {
    pub fn new(base: PathBuf) -> Self {
        Self { base }
    }

    fn container_dir(&self, destination: &str) -> Result<PathBuf, TransferError> {
        let relative = Path::new(destination);
        let valid = !destination.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !valid {
            return Err(TransferError::Rejected(format!(
                "invalid destination container '{}'",
                destination
            )));
        }
        Ok(self.base.join(relative))
    }
}

#[async_trait]
impl TransferClient for DirectoryBackend {
    async fn upload(
        &self,
        local_path: &Path,
        destination: &str,
    ) -> Result<RemoteObjectId, TransferError> {
        let name = object_name(local_path)?;
        let container = self.container_dir(destination)?;
        tokio::fs::create_dir_all(&container).await?;

        let target = container.join(&name);
        let bytes = tokio::fs::copy(local_path, &target).await?;
        debug!(
            source = %local_path.display(),
            target = %target.display(),
            bytes,
            "Copied file into container"
        );

        Ok(RemoteObjectId(format!("{}/{}", destination, name)))
    }

    fn backend_name(&self) -> &str {
        "directory"
    }
}

/// Checks that the base directory is present and writable.
pub struct DirectoryAuthorizer {
    base: PathBuf,
}

impl DirectoryAuthorizer {
    pub fn new(base: PathBuf) -> Self {
        Self { base }
    }
}

#[async_trait]
impl Authorizer for DirectoryAuthorizer {
    async fn authorize(&self) -> Result<Arc<dyn TransferClient>, TransferError> {
        let metadata = tokio::fs::metadata(&self.base).await.map_err(|e| {
            TransferError::Unauthorized(format!(
                "storage base {} is not accessible: {}",
                self.base.display(),
                e
            ))
        })?;
        if !metadata.is_dir() {
            return Err(TransferError::Unauthorized(format!(
                "storage base {} is not a directory",
                self.base.display()
            )));
        }
        if metadata.permissions().readonly() {
            return Err(TransferError::Unauthorized(format!(
                "storage base {} is read-only",
                self.base.display()
            )));
        }
        Ok(Arc::new(DirectoryBackend::new(self.base.clone())))
    }
}

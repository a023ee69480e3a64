//! CLI output: error mapping from domain errors to stable CLI surface.

use crate::error::{StorageError, SyncError, TransferError};

/// Map domain errors to the message printed on stderr.
pub fn map_error(e: &SyncError) -> String {
    match e {
        SyncError::Transfer(TransferError::Unauthorized(msg)) => format!(
            "Authorization failed: {}\nNo files were processed.",
            msg
        ),
        SyncError::Storage(StorageError::Locked(path)) => format!(
            "Another hashsync run is using {}. Run at most one instance per manifest.",
            path.display()
        ),
        SyncError::PartialFailure(n) => format!(
            "{} file(s) could not be synced; they will be retried on the next run.",
            n
        ),
        other => other.to_string(),
    }
}

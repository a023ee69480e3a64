//! End-to-end runs against the directory backend.

use crate::integration::test_utils::Fixture;
use hashsync::config::{BackendKind, TransferConfig};
use hashsync::error::{SyncError, TransferError};
use hashsync::sync::Reconciler;
use hashsync::transfer::build_authorizer;
use std::fs;
use tempfile::TempDir;

fn directory_transfer(base: &std::path::Path) -> TransferConfig {
    let mut transfer = TransferConfig {
        backend: BackendKind::Directory,
        ..TransferConfig::default()
    };
    transfer.directory.base = Some(base.to_path_buf());
    transfer
}

#[tokio::test]
async fn test_files_land_flat_in_destination_container() {
    let fx = Fixture::new();
    let remote = TempDir::new().unwrap();
    fx.write("a.txt", "hello");
    fx.write("b/c.txt", "world");

    let authorizer = build_authorizer(&directory_transfer(remote.path())).unwrap();
    let report = Reconciler::new(fx.config())
        .run(authorizer.as_ref())
        .await
        .unwrap();

    let container = remote.path().join("drive-folder");
    assert_eq!(fs::read_to_string(container.join("a.txt")).unwrap(), "hello");
    assert_eq!(fs::read_to_string(container.join("c.txt")).unwrap(), "world");
    assert!(!container.join("b").exists());
    assert_eq!(report.uploaded[1].remote_id.0, "drive-folder/c.txt");
}

#[tokio::test]
async fn test_modified_file_overwrites_remote_copy() {
    let fx = Fixture::new();
    let remote = TempDir::new().unwrap();
    fx.write("a.txt", "hello");
    let authorizer = build_authorizer(&directory_transfer(remote.path())).unwrap();
    let reconciler = Reconciler::new(fx.config());

    reconciler.run(authorizer.as_ref()).await.unwrap();
    fx.write("a.txt", "hello again");
    reconciler.run(authorizer.as_ref()).await.unwrap();

    assert_eq!(
        fs::read_to_string(remote.path().join("drive-folder/a.txt")).unwrap(),
        "hello again"
    );
}

#[tokio::test]
async fn test_missing_base_is_unauthorized() {
    let fx = Fixture::new();
    let remote = TempDir::new().unwrap();
    fx.write("a.txt", "hello");

    let authorizer =
        build_authorizer(&directory_transfer(&remote.path().join("not-mounted"))).unwrap();
    let result = Reconciler::new(fx.config()).run(authorizer.as_ref()).await;

    assert!(matches!(
        result,
        Err(SyncError::Transfer(TransferError::Unauthorized(_)))
    ));
    assert!(!fx.manifest_exists());
}

#[test]
fn test_unset_base_is_a_config_error() {
    let result = build_authorizer(&TransferConfig::default());
    assert!(matches!(result, Err(SyncError::Config(_))));
}

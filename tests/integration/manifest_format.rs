//! On-disk manifest format and compatibility with existing manifests.

use crate::integration::test_utils::{Fixture, MockTransfer};
use hashsync::sync::Reconciler;
use hashsync::types::FingerprintAlgorithm;
use std::fs;
use std::sync::Arc;

const HELLO_SHA256: &str = "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824";
const WORLD_SHA256: &str = "486ea46224d1bb4fb680f34f7c9ad96a8f24ec88be73ea8e5a6c65260e9cb8a7";

#[tokio::test]
async fn test_existing_sha256_manifest_is_honored() {
    let fx = Fixture::new();
    fx.write("a.txt", "hello");
    fx.write("b/c.txt", "world");
    // Backslash separators, no trailing newline
    fs::write(
        fx.manifest_path(),
        format!(
            "{{\n    \"a.txt\": \"{}\",\n    \"b\\\\c.txt\": \"{}\"\n}}",
            HELLO_SHA256, WORLD_SHA256
        ),
    )
    .unwrap();

    let mut config = fx.config();
    config.algorithm = FingerprintAlgorithm::Sha256;
    let client = Arc::new(MockTransfer::new());
    let report = Reconciler::new(config)
        .run_with_client(client.clone())
        .await
        .unwrap();

    assert_eq!(client.calls(), 0);
    assert_eq!(report.unchanged, 2);
    assert!(fx.manifest().contains("b/c.txt"));
}

#[tokio::test]
async fn test_saved_manifest_is_sorted_indented_json() {
    let fx = Fixture::new();
    fx.write("b/c.txt", "world");
    fx.write("a.txt", "hello");

    let mut config = fx.config();
    config.algorithm = FingerprintAlgorithm::Sha256;
    Reconciler::new(config)
        .run_with_client(Arc::new(MockTransfer::new()))
        .await
        .unwrap();

    let text = fs::read_to_string(fx.manifest_path()).unwrap();
    assert_eq!(
        text,
        format!(
            "{{\n    \"a.txt\": \"{}\",\n    \"b/c.txt\": \"{}\"\n}}\n",
            HELLO_SHA256, WORLD_SHA256
        )
    );
}

#[tokio::test]
async fn test_switching_algorithm_reuploads_everything() {
    let fx = Fixture::new();
    fx.write("a.txt", "hello");
    let reconciler = Reconciler::new(fx.config());
    reconciler
        .run_with_client(Arc::new(MockTransfer::new()))
        .await
        .unwrap();

    let mut config = fx.config();
    config.algorithm = FingerprintAlgorithm::Sha256;
    let client = Arc::new(MockTransfer::new());
    Reconciler::new(config)
        .run_with_client(client.clone())
        .await
        .unwrap();

    assert_eq!(client.uploaded(), vec!["a.txt"]);
    assert_eq!(fx.manifest().get("a.txt").unwrap().as_str(), HELLO_SHA256);
}

#[tokio::test]
async fn test_no_temp_or_lock_file_is_uploaded_when_manifest_lives_in_root() {
    let fx = Fixture::new();
    fx.write("a.txt", "hello");
    let mut config = fx.config();
    config.manifest_path = fx.root.path().join("file_metadata.json");
    let reconciler = Reconciler::new(config);

    let first = Arc::new(MockTransfer::new());
    reconciler.run_with_client(first.clone()).await.unwrap();
    let second = Arc::new(MockTransfer::new());
    reconciler.run_with_client(second.clone()).await.unwrap();

    assert_eq!(first.uploaded(), vec!["a.txt"]);
    assert_eq!(second.calls(), 0);
}

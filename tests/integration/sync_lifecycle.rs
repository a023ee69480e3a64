//! Multi-run behavior: first sync, idempotence, change detection, and no pruning.

use crate::integration::test_utils::{sorted, Fixture, MockTransfer};
use hashsync::manifest::ChangeKind;
use hashsync::sync::{Reconciler, SyncEvent};
use hashsync::tree::hasher::fingerprint_bytes;
use hashsync::types::FingerprintAlgorithm;
use std::sync::{Arc, Mutex};

#[tokio::test]
async fn test_first_run_uploads_everything_and_records_manifest() {
    let fx = Fixture::new();
    fx.write("a.txt", "hello");
    fx.write("b/c.txt", "world");

    let client = Arc::new(MockTransfer::new());
    let report = Reconciler::new(fx.config())
        .run_with_client(client.clone())
        .await
        .unwrap();

    assert_eq!(report.uploaded_paths(), vec!["a.txt", "b/c.txt"]);
    assert!(report.uploaded.iter().all(|u| u.change == ChangeKind::New));
    assert_eq!(sorted(client.uploaded()), vec!["a.txt", "c.txt"]);

    let manifest = fx.manifest();
    assert_eq!(manifest.len(), 2);
    assert_eq!(
        manifest.get("a.txt"),
        Some(&fingerprint_bytes(b"hello", FingerprintAlgorithm::Blake3))
    );
    assert_eq!(
        manifest.get("b/c.txt"),
        Some(&fingerprint_bytes(b"world", FingerprintAlgorithm::Blake3))
    );
}

#[tokio::test]
async fn test_second_run_without_changes_uploads_nothing() {
    let fx = Fixture::new();
    fx.write("a.txt", "hello");
    fx.write("b/c.txt", "world");
    let reconciler = Reconciler::new(fx.config());

    reconciler
        .run_with_client(Arc::new(MockTransfer::new()))
        .await
        .unwrap();
    let before = fx.manifest();

    let client = Arc::new(MockTransfer::new());
    let report = reconciler.run_with_client(client.clone()).await.unwrap();

    assert_eq!(client.calls(), 0);
    assert!(report.uploaded.is_empty());
    assert_eq!(report.unchanged, 2);
    assert_eq!(fx.manifest(), before);
}

#[tokio::test]
async fn test_modified_file_is_the_only_upload() {
    let fx = Fixture::new();
    fx.write("a.txt", "hello");
    fx.write("b/c.txt", "world");
    let reconciler = Reconciler::new(fx.config());
    reconciler
        .run_with_client(Arc::new(MockTransfer::new()))
        .await
        .unwrap();

    fx.write("a.txt", "hello!");
    let client = Arc::new(MockTransfer::new());
    let report = reconciler.run_with_client(client.clone()).await.unwrap();

    assert_eq!(client.uploaded(), vec!["a.txt"]);
    assert_eq!(report.uploaded[0].change, ChangeKind::Modified);
    assert_eq!(
        fx.manifest().get("a.txt"),
        Some(&fingerprint_bytes(b"hello!", FingerprintAlgorithm::Blake3))
    );
}

#[tokio::test]
async fn test_new_file_alongside_tracked_files() {
    let fx = Fixture::new();
    fx.write("a.txt", "hello");
    let reconciler = Reconciler::new(fx.config());
    reconciler
        .run_with_client(Arc::new(MockTransfer::new()))
        .await
        .unwrap();

    fx.write("nested/deeper/d.txt", "new");
    let client = Arc::new(MockTransfer::new());
    let report = reconciler.run_with_client(client.clone()).await.unwrap();

    assert_eq!(report.uploaded_paths(), vec!["nested/deeper/d.txt"]);
    assert_eq!(report.uploaded[0].change, ChangeKind::New);
    assert_eq!(report.unchanged, 1);
    assert!(fx.manifest().contains("nested/deeper/d.txt"));
}

#[tokio::test]
async fn test_deleted_files_stay_in_manifest_across_runs() {
    let fx = Fixture::new();
    fx.write("a.txt", "hello");
    fx.write("b/c.txt", "world");
    let reconciler = Reconciler::new(fx.config());
    reconciler
        .run_with_client(Arc::new(MockTransfer::new()))
        .await
        .unwrap();

    fx.remove("b/c.txt");
    for _ in 0..3 {
        let client = Arc::new(MockTransfer::new());
        reconciler.run_with_client(client.clone()).await.unwrap();
        assert_eq!(client.calls(), 0);
        assert!(fx.manifest().contains("b/c.txt"));
    }

    let plan = reconciler.plan().unwrap();
    assert_eq!(plan.stale, vec!["b/c.txt".to_string()]);
}

#[tokio::test]
async fn test_restored_file_with_same_content_is_not_reuploaded() {
    let fx = Fixture::new();
    fx.write("a.txt", "hello");
    let reconciler = Reconciler::new(fx.config());
    reconciler
        .run_with_client(Arc::new(MockTransfer::new()))
        .await
        .unwrap();

    fx.remove("a.txt");
    reconciler
        .run_with_client(Arc::new(MockTransfer::new()))
        .await
        .unwrap();
    fx.write("a.txt", "hello");

    let client = Arc::new(MockTransfer::new());
    reconciler.run_with_client(client.clone()).await.unwrap();
    assert_eq!(client.calls(), 0);
}

#[tokio::test]
async fn test_progress_events_follow_each_upload() {
    let fx = Fixture::new();
    fx.write("a.txt", "hello");
    fx.write("b.txt", "world");

    let events = Arc::new(Mutex::new(Vec::new()));
    let sink_events = Arc::clone(&events);
    let reconciler = Reconciler::new(fx.config()).with_progress(Arc::new(move |event: &SyncEvent| {
        let label = match event {
            SyncEvent::ChangeDetected { relative_path, .. } => format!("detected {}", relative_path),
            SyncEvent::Uploaded(u) => format!("uploaded {}", u.relative_path),
            SyncEvent::Skipped(f) => format!("skipped {}", f.relative_path),
        };
        sink_events.lock().unwrap().push(label);
    }));

    reconciler
        .run_with_client(Arc::new(MockTransfer::new()))
        .await
        .unwrap();

    assert_eq!(
        *events.lock().unwrap(),
        vec![
            "detected a.txt",
            "uploaded a.txt",
            "detected b.txt",
            "uploaded b.txt",
        ]
    );
}

#[tokio::test]
async fn test_dot_directories_are_synced_by_default() {
    let fx = Fixture::new();
    fx.write("a.txt", "hello");
    fx.write(".git/HEAD", "ref: refs/heads/main");
    fx.write("docs/.hashsync/notes.txt", "mine");

    let client = Arc::new(MockTransfer::new());
    let report = Reconciler::new(fx.config())
        .run_with_client(client.clone())
        .await
        .unwrap();

    assert_eq!(
        report.uploaded_paths(),
        vec![".git/HEAD", "a.txt", "docs/.hashsync/notes.txt"]
    );
}

#[tokio::test]
async fn test_ignore_patterns_skip_whole_components() {
    let fx = Fixture::new();
    fx.write("a.txt", "hello");
    fx.write("Intermediate/build.o", "obj");
    fx.write("src/Intermediate/cache.bin", "obj");

    let mut config = fx.config();
    config.ignore = vec!["Intermediate".to_string()];
    let report = Reconciler::new(config)
        .run_with_client(Arc::new(MockTransfer::new()))
        .await
        .unwrap();

    assert_eq!(report.uploaded_paths(), vec!["a.txt"]);
}

#[tokio::test]
async fn test_excluded_token_cache_is_never_uploaded() {
    let fx = Fixture::new();
    fx.write("a.txt", "hello");
    fx.write(".hashsync/token.json", r#"{"access_token": "secret"}"#);

    let mut config = fx.config();
    config.ignore = vec!["Intermediate".to_string()];
    config.exclude = vec![fx.root.path().join(".hashsync/token.json")];
    let reconciler = Reconciler::new(config);

    for _ in 0..2 {
        let client = Arc::new(MockTransfer::new());
        reconciler.run_with_client(client.clone()).await.unwrap();
        assert!(!client.uploaded().contains(&"token.json".to_string()));
    }
    assert!(!fx.manifest().contains(".hashsync/token.json"));
}

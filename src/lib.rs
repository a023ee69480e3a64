//! hashsync: One-Way Fingerprint-Based Directory Sync
//!
//! Walks a local directory tree, fingerprints every regular file, compares the
//! fingerprints against a persisted manifest, and uploads only the files that
//! are new or whose content changed. Deleted files are never pruned from the
//! manifest or the remote side.

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod manifest;
pub mod sync;
pub mod transfer;
pub mod tree;
pub mod types;

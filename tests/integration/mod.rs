//! Integration tests for hashsync

mod directory_backend;
mod manifest_format;
mod sync_lifecycle;
mod test_utils;

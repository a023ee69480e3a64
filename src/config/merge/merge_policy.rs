//! Merge rules: defaults, override order, conflict handling.

use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

/// Create a Config builder with merge policy defaults applied.
///
/// Later sources override earlier ones key by key, so a file that only sets
/// `sync.destination` keeps every other default.
pub fn builder_with_defaults() -> Result<ConfigBuilder<config::builder::DefaultState>, ConfigError>
{
    Config::builder()
        .set_default("sync.root", ".")?
        .set_default("sync.manifest_path", ".hashsync/manifest.json")?
        .set_default("sync.algorithm", "blake3")?
        .set_default("sync.persistence", "batch")?
        .set_default("sync.on_error", "abort")?
        .set_default("transfer.backend", "directory")
}

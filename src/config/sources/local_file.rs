//! Local config file source: hashsync.toml in the working directory.

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::ConfigError;
use config::File;
use std::path::{Path, PathBuf};

pub const LOCAL_CONFIG_FILE: &str = "hashsync.toml";

pub fn local_config_path(working_dir: &Path) -> PathBuf {
    working_dir.join(LOCAL_CONFIG_FILE)
}

/// Add the local config file to builder if present.
pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
    working_dir: &Path,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let path = local_config_path(working_dir);
    if path.is_file() {
        return Ok(builder.add_source(File::from(path).required(false)));
    }
    Ok(builder)
}

//! ConfigLoader: assembles sources in precedence order and deserializes.

use super::merge::merge_policy;
use super::sources::{environment, global_file, local_file};
use super::HashsyncConfig;
use crate::error::SyncError;
use config::File;
use std::path::Path;

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load from defaults, the global file, `hashsync.toml` in `working_dir`,
    /// and the environment.
    pub fn load(working_dir: &Path) -> Result<HashsyncConfig, SyncError> {
        let builder = merge_policy::builder_with_defaults()?;
        let builder = global_file::add_to_builder(builder)?;
        let builder = local_file::add_to_builder(builder, working_dir)?;
        let builder = environment::add_to_builder(builder)?;
        Ok(builder.build()?.try_deserialize()?)
    }

    /// Load from an explicit file instead of the global and local files.
    /// The file must exist.
    pub fn load_from_file(path: &Path) -> Result<HashsyncConfig, SyncError> {
        let builder = merge_policy::builder_with_defaults()?
            .add_source(File::from(path.to_path_buf()).required(true));
        let builder = environment::add_to_builder(builder)?;
        Ok(builder.build()?.try_deserialize()?)
    }
}

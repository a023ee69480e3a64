//! Environment source: HASHSYNC__SECTION__KEY variables.
//!
//! Example: `HASHSYNC__SYNC__DESTINATION=folder-id`. `sync.ignore` accepts a
//! comma-separated list.

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::ConfigError;
use config::Environment;

pub const ENV_PREFIX: &str = "HASHSYNC";

pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Ok(builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .separator("__")
            .try_parsing(true)
            .list_separator(",")
            .with_list_parse_key("sync.ignore"),
    ))
}

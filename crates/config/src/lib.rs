//! Configuration loading and environment overrides.
//!
//! Config files: `lookout.toml`, `lookout.yaml`, `lookout.yml` or `lookout.json`,
//! searched in `./` then the user config directory.

pub mod error;
pub mod loader;
pub mod schema;

pub use {
    error::{Error, Result},
    loader::{
        apply_env_overrides, config_dir, data_dir, discover_and_load, find_config_file,
        load_config,
    },
    schema::{CatalogConfig, DiscordConfig, LookoutConfig, MonitorConfig, StorageConfig},
};

//! Configuration loading and env substitution.
//!
//! Config files: `snapsend.toml`, `snapsend.yaml`, or `snapsend.json`,
//! searched in `./` then `~/.config/snapsend/`.
//!
//! Supports `${ENV_VAR}` substitution in all string values.

pub mod env_subst;
pub mod loader;
pub mod schema;

pub use {
    loader::{config_dir, discover_and_load, find_or_default_config_path, load_config},
    schema::{ChatConfig, DeliveryConfig, EmailConfig, ServerConfig, SmsConfig, SnapsendConfig},
};

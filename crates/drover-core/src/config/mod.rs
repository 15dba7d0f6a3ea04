//! Configuration management for Drover
//!
//! Configuration is layered: defaults, then TOML files, then `DROVER_*`
//! environment variables, then explicit overrides. See [`ConfigLoader`].

mod engine_config;
mod env_loader;
mod loader;
mod logging_config;


pub use engine_config::{
    AgentsConfig, CheckpointsConfig, EngineConfig, StorageConfig, ToolsConfig,
    DEFAULT_APPROVAL_RULES_KEY,
};
pub use env_loader::{apply_env, apply_env_with};
pub use loader::{ConfigLoader, ConfigSource};
pub use logging_config::{LogFormat, LoggingConfig};

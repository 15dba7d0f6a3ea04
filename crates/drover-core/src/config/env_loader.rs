//! Environment variable overrides
//!
//! Recognised variables:
//! - `DROVER_STATE_DIR`
//! - `DROVER_AGENTS_DIR` (platform path list, appended to `agents.directories`)
//! - `DROVER_MAX_TURNS`
//! - `DROVER_MAX_TIME_MINUTES`
//! - `DROVER_CHECKPOINT_DIR`
//! - `DROVER_TRIM_WINDOW`
//! - `DROVER_PARALLEL_TOOL_CALLS`
//! - `DROVER_LOG_LEVEL`
//! - `DROVER_LOG_FORMAT`

use std::env;
use std::path::PathBuf;

use super::engine_config::EngineConfig;
use crate::error::{DroverError, DroverResult};

/// Apply `DROVER_*` overrides from the process environment
pub fn apply_env(config: &mut EngineConfig) -> DroverResult<()> {
    apply_env_with(config, |key| env::var(key).ok())
}

/// Apply `DROVER_*` overrides using a custom variable lookup
pub fn apply_env_with<F>(config: &mut EngineConfig, lookup: F) -> DroverResult<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(dir) = lookup("DROVER_STATE_DIR") {
        config.storage.state_dir = PathBuf::from(dir);
    }

    if let Some(dirs) = lookup("DROVER_AGENTS_DIR") {
        config.agents.directories.extend(env::split_paths(&dirs));
    }

    if let Some(value) = lookup("DROVER_MAX_TURNS") {
        config.agents.default_max_turns = value
            .parse()
            .map_err(|_| DroverError::config(format!("Invalid DROVER_MAX_TURNS value: {}", value)))?;
    }

    if let Some(value) = lookup("DROVER_MAX_TIME_MINUTES") {
        config.agents.default_max_time_minutes = value.parse().map_err(|_| {
            DroverError::config(format!("Invalid DROVER_MAX_TIME_MINUTES value: {}", value))
        })?;
    }

    if let Some(dir) = lookup("DROVER_CHECKPOINT_DIR") {
        config.checkpoints.directory = Some(PathBuf::from(dir));
    }

    if let Some(value) = lookup("DROVER_TRIM_WINDOW") {
        config.checkpoints.trim_window = value.parse().map_err(|_| {
            DroverError::config(format!("Invalid DROVER_TRIM_WINDOW value: {}", value))
        })?;
    }

    if let Some(value) = lookup("DROVER_PARALLEL_TOOL_CALLS") {
        config.tools.parallel_tool_calls = parse_bool(&value).ok_or_else(|| {
            DroverError::config(format!("Invalid DROVER_PARALLEL_TOOL_CALLS value: {}", value))
        })?;
    }

    if let Some(level) = lookup("DROVER_LOG_LEVEL") {
        config.logging.level = level.to_ascii_lowercase();
    }

    if let Some(format) = lookup("DROVER_LOG_FORMAT") {
        config.logging.format = format.parse().map_err(DroverError::config)?;
    }

    Ok(())
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

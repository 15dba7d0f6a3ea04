//! Engine configuration model

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::logging_config::LoggingConfig;
use crate::error::{DroverError, DroverResult};

/// Storage key under which approval rules are persisted
pub const DEFAULT_APPROVAL_RULES_KEY: &str = "approval_rules";

/// Top-level engine configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Persisted state (approval rules)
    pub storage: StorageConfig,
    /// Agent definition discovery and default budgets
    pub agents: AgentsConfig,
    /// History checkpoints and trimming
    pub checkpoints: CheckpointsConfig,
    /// Tool dispatch settings
    pub tools: ToolsConfig,
    /// Logging settings
    pub logging: LoggingConfig,
}

/// Persisted key-value storage settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding the state file
    pub state_dir: PathBuf,
    /// Key holding the approval rule list
    pub approval_rules_key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            state_dir: default_state_dir(),
            approval_rules_key: DEFAULT_APPROVAL_RULES_KEY.to_string(),
        }
    }
}

impl StorageConfig {
    /// Path of the JSON state file inside `state_dir`
    pub fn state_file(&self) -> PathBuf {
        self.state_dir.join("state.json")
    }
}

/// Agent definition settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentsConfig {
    /// Extra directories scanned for agent definition files, lowest priority first
    pub directories: Vec<PathBuf>,
    /// Turn budget used when a definition file omits one
    pub default_max_turns: u32,
    /// Wall-clock budget used when a definition file omits one
    pub default_max_time_minutes: f64,
}

impl Default for AgentsConfig {
    fn default() -> Self {
        Self {
            directories: Vec::new(),
            default_max_turns: 15,
            default_max_time_minutes: 5.0,
        }
    }
}

/// Checkpoint and history trimming settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckpointsConfig {
    /// Checkpoint directory; defaults to `<state_dir>/checkpoints`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directory: Option<PathBuf>,
    /// Number of most recent turns kept by a manual trim
    pub trim_window: usize,
    /// Tool output payloads above this many bytes are replaced on trim
    pub trim_threshold_bytes: usize,
}

impl Default for CheckpointsConfig {
    fn default() -> Self {
        Self {
            directory: None,
            trim_window: 20,
            trim_threshold_bytes: 8 * 1024,
        }
    }
}

/// Tool dispatch settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    /// Bound on `getDescription()` output
    pub description_max_length: usize,
    /// Default for definitions that do not set `parallel_tool_calls`
    pub parallel_tool_calls: bool,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            description_max_length: 200,
            parallel_tool_calls: false,
        }
    }
}

impl EngineConfig {
    /// Resolved checkpoint directory
    pub fn checkpoint_dir(&self) -> PathBuf {
        self.checkpoints
            .directory
            .clone()
            .unwrap_or_else(|| self.storage.state_dir.join("checkpoints"))
    }

    /// Expand `~` and environment variables in every configured path
    pub fn expand_paths(&mut self) {
        self.storage.state_dir = expand_path(&self.storage.state_dir);
        self.agents.directories = self.agents.directories.iter().map(|p| expand_path(p)).collect();
        if let Some(dir) = &self.checkpoints.directory {
            self.checkpoints.directory = Some(expand_path(dir));
        }
        if let Some(file) = &self.logging.log_file {
            self.logging.log_file = Some(expand_path(file));
        }
    }

    /// Validate the merged configuration
    pub fn validate(&self) -> DroverResult<()> {
        if self.agents.default_max_turns == 0 {
            return Err(DroverError::config("agents.default_max_turns must be greater than 0"));
        }
        let minutes = self.agents.default_max_time_minutes;
        if !minutes.is_finite() || minutes <= 0.0 {
            return Err(DroverError::config(
                "agents.default_max_time_minutes must be a positive number",
            ));
        }
        if self.checkpoints.trim_window == 0 {
            return Err(DroverError::config("checkpoints.trim_window must be greater than 0"));
        }
        if self.tools.description_max_length < 16 {
            return Err(DroverError::config(
                "tools.description_max_length must be at least 16",
            ));
        }
        if self.storage.approval_rules_key.trim().is_empty() {
            return Err(DroverError::config("storage.approval_rules_key must not be empty"));
        }
        if !self.logging.has_valid_level() {
            return Err(DroverError::config(format!(
                "logging.level '{}' is not one of {:?}",
                self.logging.level,
                LoggingConfig::LEVELS
            )));
        }
        if self.logging.log_to_file && self.logging.log_file.is_none() {
            return Err(DroverError::config(
                "logging.log_file is required when logging.log_to_file is set",
            ));
        }
        Ok(())
    }
}

fn default_state_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("drover"))
        .unwrap_or_else(|| PathBuf::from(".drover"))
}

fn expand_path(path: &std::path::Path) -> PathBuf {
    let raw = path.to_string_lossy();
    match shellexpand::full(&raw) {
        Ok(expanded) => PathBuf::from(expanded.as_ref()),
        Err(e) => {
            tracing::warn!(path = %raw, error = %e, "Failed to expand path, using it verbatim");
            path.to_path_buf()
        }
    }
}

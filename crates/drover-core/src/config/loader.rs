//! Configuration loading from layered sources

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use super::engine_config::EngineConfig;
use super::env_loader;
use crate::error::{DroverError, DroverResult};

/// Source of configuration data
#[derive(Debug, Clone)]
pub enum ConfigSource {
    /// Built-in defaults
    Default,
    /// A TOML file; missing files are skipped
    File(PathBuf),
    /// `DROVER_*` environment variables
    Environment,
    /// Dotted-key overrides such as `agents.default_max_turns = "30"`
    Overrides(HashMap<String, String>),
}

/// Configuration loader with support for multiple sources
///
/// Sources are applied in the order they were added. File and override
/// sources only replace the keys they actually set.
#[derive(Debug, Default)]
pub struct ConfigLoader {
    sources: Vec<ConfigSource>,
}

impl ConfigLoader {
    /// Create a new config loader
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a configuration source
    pub fn add_source(mut self, source: ConfigSource) -> Self {
        self.sources.push(source);
        self
    }

    /// Add default configuration source
    pub fn with_defaults(self) -> Self {
        self.add_source(ConfigSource::Default)
    }

    /// Add a file source
    pub fn with_file<P: AsRef<Path>>(self, path: P) -> Self {
        self.add_source(ConfigSource::File(path.as_ref().to_path_buf()))
    }

    /// Add environment variables source
    pub fn with_env(self) -> Self {
        self.add_source(ConfigSource::Environment)
    }

    /// Add explicit dotted-key overrides
    pub fn with_overrides(self, overrides: HashMap<String, String>) -> Self {
        self.add_source(ConfigSource::Overrides(overrides))
    }

    /// Load configuration from all sources, expand paths and validate
    pub fn load(self) -> DroverResult<EngineConfig> {
        let mut config = EngineConfig::default();

        for source in &self.sources {
            config = Self::apply_source(config, source)?;
        }

        config.expand_paths();
        config.validate()?;
        tracing::debug!(
            state_dir = %config.storage.state_dir.display(),
            agent_dirs = config.agents.directories.len(),
            "Configuration loaded"
        );
        Ok(config)
    }

    fn apply_source(config: EngineConfig, source: &ConfigSource) -> DroverResult<EngineConfig> {
        match source {
            ConfigSource::Default => {
                tracing::debug!("Loading default config");
                Ok(EngineConfig::default())
            }
            ConfigSource::File(path) => {
                tracing::debug!("Loading config from file: {}", path.display());
                Self::merge_file(config, path)
            }
            ConfigSource::Environment => {
                tracing::debug!("Loading config from environment");
                let mut config = config;
                env_loader::apply_env(&mut config)?;
                Ok(config)
            }
            ConfigSource::Overrides(overrides) => {
                tracing::debug!(count = overrides.len(), "Applying config overrides");
                Self::merge_overrides(config, overrides)
            }
        }
    }

    fn merge_file(config: EngineConfig, path: &Path) -> DroverResult<EngineConfig> {
        if !path.exists() {
            tracing::debug!("Config file {} not found, skipping", path.display());
            return Ok(config);
        }

        let content = fs::read_to_string(path).map_err(|e| {
            DroverError::config_with_context(
                format!("Failed to read config file: {}", e),
                format!("Reading configuration from '{}'", path.display()),
            )
        })?;

        let overlay: toml::Value = toml::from_str(&content).map_err(|e| {
            DroverError::config_with_context(
                format!("Invalid TOML: {}", e),
                format!("Parsing configuration from '{}'", path.display()),
            )
        })?;

        Self::merge_value(config, overlay)
    }

    fn merge_overrides(
        config: EngineConfig,
        overrides: &HashMap<String, String>,
    ) -> DroverResult<EngineConfig> {
        let mut overlay = toml::value::Table::new();
        for (key, raw) in overrides {
            let mut segments: Vec<&str> = key.split('.').collect();
            let leaf = segments
                .pop()
                .filter(|s| !s.is_empty())
                .ok_or_else(|| DroverError::config(format!("Invalid override key '{}'", key)))?;

            let mut table = &mut overlay;
            for segment in segments {
                let entry = table
                    .entry(segment.to_string())
                    .or_insert_with(|| toml::Value::Table(toml::value::Table::new()));
                table = entry.as_table_mut().ok_or_else(|| {
                    DroverError::config(format!("Override key '{}' conflicts with a value", key))
                })?;
            }
            table.insert(leaf.to_string(), parse_scalar(raw));
        }

        Self::merge_value(config, toml::Value::Table(overlay))
    }

    fn merge_value(config: EngineConfig, overlay: toml::Value) -> DroverResult<EngineConfig> {
        let mut base = toml::Value::try_from(&config)
            .map_err(|e| DroverError::config(format!("Failed to serialize config: {}", e)))?;
        deep_merge(&mut base, overlay);
        base.try_into()
            .map_err(|e: toml::de::Error| DroverError::config(format!("Invalid configuration: {}", e)))
    }
}

/// Interpret a raw override string as the most specific TOML scalar
fn parse_scalar(raw: &str) -> toml::Value {
    if let Ok(b) = raw.parse::<bool>() {
        return toml::Value::Boolean(b);
    }
    if let Ok(i) = raw.parse::<i64>() {
        return toml::Value::Integer(i);
    }
    if let Ok(f) = raw.parse::<f64>() {
        return toml::Value::Float(f);
    }
    toml::Value::String(raw.to_string())
}

fn deep_merge(base: &mut toml::Value, overlay: toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base), toml::Value::Table(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(existing) => deep_merge(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

//! Agent definition files

use std::fs;
use std::path::{Path, PathBuf};

use super::AgentRegistry;
use crate::agent::types::AgentDefinition;
use crate::error::{DroverError, DroverResult};

/// Loads agent definitions from `*.toml`, `*.yaml`/`*.yml` and `*.json` files
///
/// Directories are processed in the order given, so later directories
/// (e.g. project-local ones) shadow earlier ones (e.g. user-level ones).
#[derive(Debug, Clone, Default)]
pub struct AgentLoader {
    directories: Vec<PathBuf>,
}

impl AgentLoader {
    /// Create a loader with no directories
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a directory to scan
    pub fn with_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.directories.push(dir.into());
        self
    }

    /// Add several directories to scan
    pub fn with_directories<I, P>(mut self, dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.directories.extend(dirs.into_iter().map(Into::into));
        self
    }

    /// Parse one definition file
    pub fn load_file(path: &Path) -> DroverResult<AgentDefinition> {
        let content = fs::read_to_string(path)
            .map_err(|e| DroverError::io_with_path(e.to_string(), path.display().to_string()))?;

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        let definition: AgentDefinition = match extension.as_str() {
            "toml" => toml::from_str(&content)?,
            "yaml" | "yml" => serde_yaml::from_str(&content)?,
            "json" => serde_json::from_str(&content)?,
            other => {
                return Err(DroverError::validation(format!(
                    "unsupported agent definition format '{}'",
                    other
                )));
            }
        };
        Ok(definition)
    }

    /// Every parseable definition, in directory order then file-name order.
    ///
    /// Missing directories are skipped. Malformed files are logged and skipped.
    pub fn load_all(&self) -> Vec<AgentDefinition> {
        let mut definitions = Vec::new();

        for dir in &self.directories {
            let entries = match fs::read_dir(dir) {
                Ok(entries) => entries,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    tracing::debug!(dir = %dir.display(), "Agent directory not found, skipping");
                    continue;
                }
                Err(e) => {
                    tracing::warn!(dir = %dir.display(), error = %e, "Failed to read agent directory");
                    continue;
                }
            };

            let mut files: Vec<PathBuf> = entries
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|path| path.is_file() && is_definition_file(path))
                .collect();
            files.sort();

            for path in files {
                match Self::load_file(&path) {
                    Ok(definition) => {
                        tracing::debug!(agent = %definition.name, file = %path.display(), "Loaded agent definition");
                        definitions.push(definition);
                    }
                    Err(e) => {
                        tracing::warn!(file = %path.display(), error = %e, "Skipping malformed agent definition");
                    }
                }
            }
        }

        definitions
    }

    /// Load every definition into `registry`; returns how many were accepted
    pub fn load_into(&self, registry: &AgentRegistry) -> usize {
        self.load_all()
            .into_iter()
            .map(|definition| registry.register_agent(definition))
            .filter(|accepted| *accepted)
            .count()
    }
}

fn is_definition_file(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase).as_deref(),
        Some("toml" | "yaml" | "yml" | "json")
    )
}

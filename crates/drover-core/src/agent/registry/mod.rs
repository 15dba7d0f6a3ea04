//! Agent registry, definition loading and built-in agents

mod builtin;
mod loader;

#[cfg(test)]
mod tests;

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use super::types::AgentDefinition;

pub use builtin::{codebase_investigator_agent, get_builtin_agents, register_builtin_agents};
pub use loader::AgentLoader;

/// Registry of available agent definitions
///
/// Owned by the runtime context and passed by reference; there is no global
/// agent map. Registering an existing name replaces it, which lets user and
/// project definitions shadow built-ins.
#[derive(Debug, Default)]
pub struct AgentRegistry {
    definitions: RwLock<HashMap<String, AgentDefinition>>,
}

/// Shared agent registry type
pub type SharedAgentRegistry = Arc<AgentRegistry>;

impl AgentRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the built-in agents
    pub fn with_builtins() -> Self {
        let registry = Self::new();
        register_builtin_agents(&registry);
        registry
    }

    /// Register a definition
    ///
    /// Definitions without a name or description are logged and ignored.
    /// Returns whether the definition was stored.
    pub fn register_agent(&self, definition: AgentDefinition) -> bool {
        if !definition.has_identity() {
            tracing::warn!(
                name = %definition.name,
                "Ignoring agent definition without a name or description"
            );
            return false;
        }

        let name = definition.name.clone();
        if self.definitions.write().insert(name.clone(), definition).is_some() {
            tracing::info!(agent = %name, "Agent definition overridden by a later registration");
        } else {
            tracing::debug!(agent = %name, "Registered agent definition");
        }
        true
    }

    /// Get a definition by name
    pub fn get_definition(&self, name: &str) -> Option<AgentDefinition> {
        self.definitions.read().get(name).cloned()
    }

    /// All definitions, sorted by name
    pub fn get_all_definitions(&self) -> Vec<AgentDefinition> {
        let mut definitions: Vec<AgentDefinition> = self.definitions.read().values().cloned().collect();
        definitions.sort_by(|a, b| a.name.cmp(&b.name));
        definitions
    }

    /// Check if a name is registered
    pub fn contains(&self, name: &str) -> bool {
        self.definitions.read().contains_key(name)
    }

    /// Number of registered definitions
    pub fn len(&self) -> usize {
        self.definitions.read().len()
    }

    /// Check if the registry has no definitions
    pub fn is_empty(&self) -> bool {
        self.definitions.read().is_empty()
    }
}

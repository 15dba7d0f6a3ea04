//! Tool registry for managing available tools

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use super::tool_trait::Tool;
use super::types::ToolSchema;
use crate::agent::{AgentRegistry, RuntimeContext, SubagentTool};

/// Registry mapping tool names to tools
///
/// Registration takes `&self` so a registry shared through a
/// [`RuntimeContext`] can still gain subagent tools after construction.
#[derive(Default)]
pub struct ToolRegistry {
    tools: RwLock<HashMap<String, Arc<dyn Tool>>>,
}

/// Shared tool registry type
pub type SharedToolRegistry = Arc<ToolRegistry>;

impl ToolRegistry {
    /// Create a new tool registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool, replacing any tool with the same name
    pub fn register(&self, tool: Arc<dyn Tool>) -> Option<Arc<dyn Tool>> {
        let name = tool.name().to_string();
        let previous = self.tools.write().insert(name.clone(), tool);
        if previous.is_some() {
            tracing::debug!(tool = %name, "Replaced registered tool");
        }
        previous
    }

    /// Get a tool by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.read().get(name).cloned()
    }

    /// Check if a tool is registered
    pub fn has_tool(&self, name: &str) -> bool {
        self.tools.read().contains_key(name)
    }

    /// All registered tool names, sorted
    pub fn get_all_tool_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tools.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Declarations for the named tools, in the given order; unknown names are skipped
    pub fn declarations(&self, names: &[String]) -> Vec<ToolSchema> {
        let tools = self.tools.read();
        names
            .iter()
            .filter_map(|name| tools.get(name).map(|tool| tool.schema()))
            .collect()
    }

    /// Remove a tool
    pub fn remove(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.write().remove(name)
    }

    /// Number of registered tools
    pub fn len(&self) -> usize {
        self.tools.read().len()
    }

    /// Whether no tools are registered
    pub fn is_empty(&self) -> bool {
        self.tools.read().is_empty()
    }

    /// Expose every definition in `agents` as a [`SubagentTool`].
    ///
    /// A definition whose name collides with a non-subagent tool is skipped.
    /// Returns the number of subagent tools registered.
    pub fn register_subagents(&self, agents: &AgentRegistry, runtime: &Arc<RuntimeContext>) -> usize {
        let mut registered = 0;
        for definition in agents.get_all_definitions() {
            if let Some(existing) = self.get(&definition.name) {
                if existing.kind() != super::ToolKind::Think {
                    tracing::warn!(
                        agent = %definition.name,
                        "Agent name collides with a registered tool, not exposing it as a subagent"
                    );
                    continue;
                }
            }
            self.register(Arc::new(SubagentTool::new(definition, Arc::downgrade(runtime))));
            registered += 1;
        }
        tracing::debug!(count = registered, "Registered subagent tools");
        registered
    }
}

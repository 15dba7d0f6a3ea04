//! Collaborators shared by every executor of a session

use std::sync::Arc;

use crate::agent::registry::{AgentLoader, AgentRegistry, SharedAgentRegistry};
use crate::approval::{ApprovalStore, ConfirmationGate, SharedConfirmationHandler};
use crate::config::{AgentsConfig, EngineConfig, ToolsConfig};
use crate::error::DroverResult;
use crate::llm::SharedModelClient;
use crate::storage::{FileStorage, MemoryStorage, SharedStorage};
use crate::tools::{SharedToolRegistry, ToolRegistry};

/// Runtime collaborators handed to executors
///
/// Holds the registries, the model client and the confirmation gate. Child
/// executors started by subagent tools share the same context.
pub struct RuntimeContext {
    tool_registry: SharedToolRegistry,
    agent_registry: SharedAgentRegistry,
    model_client: SharedModelClient,
    gate: ConfirmationGate,
    tools_config: ToolsConfig,
    agents_config: AgentsConfig,
}

impl std::fmt::Debug for RuntimeContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuntimeContext")
            .field("tools", &self.tool_registry.get_all_tool_names())
            .field("agents", &self.agent_registry.len())
            .field("tools_config", &self.tools_config)
            .field("agents_config", &self.agents_config)
            .finish()
    }
}

impl RuntimeContext {
    /// Start building a context around a model client
    pub fn builder(model_client: SharedModelClient) -> RuntimeContextBuilder {
        RuntimeContextBuilder::new(model_client)
    }

    /// Build a context from engine configuration
    ///
    /// Approval rules persist in `storage.state_dir`; agent registry holds
    /// the built-ins plus every definition found in `agents.directories`.
    /// The tool registry starts empty: register tools, then call
    /// [`RuntimeContext::register_subagents`].
    pub fn from_config(
        config: &EngineConfig,
        model_client: SharedModelClient,
        handler: Option<SharedConfirmationHandler>,
    ) -> DroverResult<Arc<Self>> {
        config.validate()?;

        let storage: SharedStorage = Arc::new(FileStorage::new(config.storage.state_file()));
        let store = Arc::new(ApprovalStore::with_key(
            storage,
            config.storage.approval_rules_key.clone(),
        ));
        let mut gate = ConfirmationGate::new(store);
        if let Some(handler) = handler {
            gate = gate.with_handler(handler);
        }

        let agents = AgentRegistry::with_builtins();
        let loaded = AgentLoader::new()
            .with_directories(config.agents.directories.iter().cloned())
            .load_into(&agents);
        tracing::debug!(loaded = loaded, total = agents.len(), "Agent registry initialised");

        Ok(Self::builder(model_client)
            .with_agent_registry(Arc::new(agents))
            .with_gate(gate)
            .with_tools_config(config.tools.clone())
            .with_agents_config(config.agents.clone())
            .build())
    }

    pub fn tool_registry(&self) -> &SharedToolRegistry {
        &self.tool_registry
    }

    pub fn agent_registry(&self) -> &SharedAgentRegistry {
        &self.agent_registry
    }

    pub fn model_client(&self) -> &SharedModelClient {
        &self.model_client
    }

    pub fn gate(&self) -> &ConfirmationGate {
        &self.gate
    }

    pub fn tools_config(&self) -> &ToolsConfig {
        &self.tools_config
    }

    pub fn agents_config(&self) -> &AgentsConfig {
        &self.agents_config
    }

    /// Expose every registered agent as a subagent tool
    pub fn register_subagents(self: &Arc<Self>) -> usize {
        self.tool_registry
            .register_subagents(&self.agent_registry, self)
    }
}

/// Builder for [`RuntimeContext`]
pub struct RuntimeContextBuilder {
    model_client: SharedModelClient,
    tool_registry: Option<SharedToolRegistry>,
    agent_registry: Option<SharedAgentRegistry>,
    gate: Option<ConfirmationGate>,
    tools_config: ToolsConfig,
    agents_config: AgentsConfig,
}

impl RuntimeContextBuilder {
    /// Create a new builder
    pub fn new(model_client: SharedModelClient) -> Self {
        Self {
            model_client,
            tool_registry: None,
            agent_registry: None,
            gate: None,
            tools_config: ToolsConfig::default(),
            agents_config: AgentsConfig::default(),
        }
    }

    pub fn with_tool_registry(mut self, registry: SharedToolRegistry) -> Self {
        self.tool_registry = Some(registry);
        self
    }

    pub fn with_agent_registry(mut self, registry: SharedAgentRegistry) -> Self {
        self.agent_registry = Some(registry);
        self
    }

    pub fn with_gate(mut self, gate: ConfirmationGate) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn with_tools_config(mut self, config: ToolsConfig) -> Self {
        self.tools_config = config;
        self
    }

    pub fn with_agents_config(mut self, config: AgentsConfig) -> Self {
        self.agents_config = config;
        self
    }

    /// Build the context
    ///
    /// Without an explicit gate, approval rules live in memory and calls that
    /// need confirmation are denied.
    pub fn build(self) -> Arc<RuntimeContext> {
        let gate = self.gate.unwrap_or_else(|| {
            let storage: SharedStorage = Arc::new(MemoryStorage::new());
            ConfirmationGate::new(Arc::new(ApprovalStore::new(storage)))
        });

        Arc::new(RuntimeContext {
            tool_registry: self.tool_registry.unwrap_or_else(|| Arc::new(ToolRegistry::new())),
            agent_registry: self.agent_registry.unwrap_or_else(|| Arc::new(AgentRegistry::new())),
            model_client: self.model_client,
            gate,
            tools_config: self.tools_config,
            agents_config: self.agents_config,
        })
    }
}

//! Agents: definitions, registry and the execution engine
//!
//! An [`AgentExecutor`] drives one run of one [`AgentDefinition`]: it streams
//! model output, routes requested tool calls through the confirmation gate
//! and the tool registry, feeds results back, and stops on goal, budget
//! exhaustion, error or cancellation. Any definition can also be exposed to
//! other agents as a tool through [`SubagentTool`].

mod executor;
mod registry;
mod subagent_tool;
mod types;

pub use executor::{AgentExecutor, RuntimeContext, RuntimeContextBuilder};
pub use registry::{
    AgentLoader, AgentRegistry, SharedAgentRegistry, codebase_investigator_agent,
    get_builtin_agents, register_builtin_agents,
};
pub use subagent_tool::SubagentTool;
pub use types::{
    AgentDefinition, AgentInputs, COMPLETE_TASK_TOOL, DEFAULT_OUTPUT_NAME, DEFAULT_QUERY,
    InputConfig, InputSpec, InputType, ModelConfig, OutputConfig, PromptConfig, RunConfig,
    RunResult, TerminateReason, ToolConfig, placeholders, render_template,
};

//! Drover Core Library
//!
//! This crate provides the agent execution engine for Drover: a multi-turn
//! executor that streams model output, dispatches requested tool calls
//! through a confirmation gate, and reports progress on an activity stream.

pub mod activity;
pub mod agent;
pub mod approval;
pub mod checkpoints;
pub mod config;
pub mod error;
pub mod llm;
pub mod logging;
pub mod storage;
pub mod tools;

// Re-export commonly used types
pub use activity::{ActivityEvent, ActivityKind, ActivityReceiver, ActivityStream};
pub use agent::{
    AgentDefinition, AgentExecutor, AgentInputs, AgentRegistry, RunResult, RuntimeContext,
    SubagentTool, TerminateReason,
};
pub use approval::{
    ApprovalRule, ApprovalRuleType, ApprovalStore, ConfirmationGate, ConfirmationHandler,
    ConfirmationOutcome, ConfirmationRequest,
};
pub use checkpoints::{CheckpointManager, trim_history};
pub use config::{ConfigLoader, EngineConfig};
pub use error::{DroverError, DroverResult};
pub use llm::{Content, ModelClient, ModelEvent, Part};
pub use logging::init_logging;
pub use storage::{FileStorage, MemoryStorage, Storage};
pub use tools::{Tool, ToolInvocation, ToolRegistry, ToolResult};

//! Agent definition, input and result types

mod definition;
mod inputs;
mod result;
mod template;


pub use definition::{
    AgentDefinition, ModelConfig, OutputConfig, PromptConfig, RunConfig, ToolConfig,
    COMPLETE_TASK_TOOL, DEFAULT_OUTPUT_NAME, DEFAULT_QUERY,
};
pub use inputs::{AgentInputs, InputConfig, InputSpec, InputType};
pub use result::{RunResult, TerminateReason};
pub use template::{placeholders, render_template};

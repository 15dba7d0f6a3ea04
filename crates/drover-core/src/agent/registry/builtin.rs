//! Built-in agent definitions

use super::AgentRegistry;
use crate::agent::types::{
    AgentDefinition, InputConfig, InputSpec, InputType, ModelConfig, OutputConfig, RunConfig,
};

/// Get all built-in agent definitions
pub fn get_builtin_agents() -> Vec<AgentDefinition> {
    vec![codebase_investigator_agent()]
}

/// Register every built-in agent
pub fn register_builtin_agents(registry: &AgentRegistry) {
    for agent in get_builtin_agents() {
        registry.register_agent(agent);
    }
}

/// Read-only agent that explores a codebase and reports its findings
///
/// Uses only read and search tools, so it never needs confirmation for
/// side effects.
pub fn codebase_investigator_agent() -> AgentDefinition {
    AgentDefinition::new(
        "codebase_investigator",
        "Investigates a codebase to answer a question or map out how a feature works. \
         Read-only: never modifies files.",
    )
    .with_display_name("Codebase Investigator")
    .with_model_config(ModelConfig {
        temperature: Some(0.1),
        thinking_budget: Some(-1),
        ..ModelConfig::default()
    })
    .with_tools(["list_directory", "read_file", "glob", "search_file_content"])
    .with_run_config(RunConfig {
        max_turns: Some(15),
        max_time_minutes: Some(5.0),
        parallel_tool_calls: Some(true),
        deny_is_fatal: false,
    })
    .with_input_config(
        InputConfig::default()
            .with_input(
                "objective",
                InputSpec::required(
                    InputType::String,
                    "The question to answer or the area of the code to investigate",
                ),
            )
            .with_input(
                "focus_paths",
                InputSpec::optional(
                    InputType::Array,
                    "Directories or files to start from",
                ),
            ),
    )
    .with_output_config(OutputConfig {
        output_name: "report".to_string(),
        description: "Findings, with the relevant file paths and a short explanation of each."
            .to_string(),
    })
    .with_prompts(INVESTIGATOR_SYSTEM_PROMPT, "Investigate: ${objective}\nStart from: ${focus_paths}")
}

const INVESTIGATOR_SYSTEM_PROMPT: &str = r#"You are a codebase investigator.

Objective: ${objective}

Explore the code using only the tools you have been given. Prefer searching
over reading whole directories. Keep notes of the files that matter and why.

When you can answer the objective, call `complete_task` with a report that
lists the relevant files and explains how they fit together. Do not guess:
if something could not be determined, say so in the report."#;

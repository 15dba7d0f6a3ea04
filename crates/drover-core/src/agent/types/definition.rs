//! Agent definition

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::inputs::InputConfig;
use super::template::placeholders;
use crate::error::{DroverError, DroverResult};
use crate::tools::{ToolParameter, ToolSchema};

/// Name of the terminal tool every agent can call to finish
pub const COMPLETE_TASK_TOOL: &str = "complete_task";

/// Parameter name `complete_task` uses when `output_config` does not set one
pub const DEFAULT_OUTPUT_NAME: &str = "result";

/// First user message when `prompt_config.query` is not set
pub const DEFAULT_QUERY: &str = "Get Started!";

static AGENT_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_-]*$").expect("valid agent name regex"));

/// Model selection and sampling parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub provider: String,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    /// Token budget for model-side reasoning; `-1` lets the model decide
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thinking_budget: Option<i64>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            provider: "default".to_string(),
            model: "default".to_string(),
            temperature: None,
            top_p: None,
            thinking_budget: None,
        }
    }
}

/// Tools the agent may call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolConfig {
    pub tools: Vec<String>,
}

/// Run budget and dispatch policy
///
/// Unset budgets fall back to the engine's `agents` configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_turns: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_time_minutes: Option<f64>,
    /// Dispatch all calls of a turn together
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parallel_tool_calls: Option<bool>,
    /// End the run with `ABORTED` on the first denied confirmation
    pub deny_is_fatal: bool,
}

/// Shape of the value `complete_task` returns
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub output_name: String,
    pub description: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            output_name: DEFAULT_OUTPUT_NAME.to_string(),
            description: "The final result of the task.".to_string(),
        }
    }
}

/// Prompt templates; both may reference inputs as `${name}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
}

impl PromptConfig {
    /// Query template, falling back to [`DEFAULT_QUERY`]
    pub fn query_template(&self) -> &str {
        self.query.as_deref().unwrap_or(DEFAULT_QUERY)
    }
}

/// Declarative description of a named agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentDefinition {
    /// Unique key; also the tool name when exposed as a subagent
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub model_config: ModelConfig,
    #[serde(default)]
    pub tool_config: ToolConfig,
    #[serde(default)]
    pub run_config: RunConfig,
    #[serde(default)]
    pub input_config: InputConfig,
    #[serde(default)]
    pub output_config: OutputConfig,
    #[serde(default)]
    pub prompt_config: PromptConfig,
}

impl fmt::Display for AgentDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "AgentDefinition({}, tools: [{}])",
            self.name,
            self.tool_config.tools.join(", ")
        )
    }
}

impl AgentDefinition {
    /// Create a definition with default configuration
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            display_name: None,
            description: description.into(),
            model_config: ModelConfig::default(),
            tool_config: ToolConfig::default(),
            run_config: RunConfig::default(),
            input_config: InputConfig::default(),
            output_config: OutputConfig::default(),
            prompt_config: PromptConfig::default(),
        }
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    pub fn with_model_config(mut self, model_config: ModelConfig) -> Self {
        self.model_config = model_config;
        self
    }

    pub fn with_tools<I, S>(mut self, tools: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tool_config.tools = tools.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_run_config(mut self, run_config: RunConfig) -> Self {
        self.run_config = run_config;
        self
    }

    pub fn with_input_config(mut self, input_config: InputConfig) -> Self {
        self.input_config = input_config;
        self
    }

    pub fn with_output_config(mut self, output_config: OutputConfig) -> Self {
        self.output_config = output_config;
        self
    }

    pub fn with_prompts(mut self, system_prompt: impl Into<String>, query: impl Into<String>) -> Self {
        self.prompt_config = PromptConfig {
            system_prompt: Some(system_prompt.into()),
            query: Some(query.into()),
        };
        self
    }

    /// Name shown to users
    pub fn display_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.name)
    }

    /// Whether the registry-level requirements (name and description) hold
    pub fn has_identity(&self) -> bool {
        !self.name.trim().is_empty() && !self.description.trim().is_empty()
    }

    /// Full validation, run before an executor is created
    pub fn validate(&self) -> DroverResult<()> {
        if !self.has_identity() {
            return Err(DroverError::validation_field(
                "agent definition requires a name and a description",
                "name",
            ));
        }
        if !AGENT_NAME.is_match(&self.name) {
            return Err(DroverError::validation_field(
                format!(
                    "agent name '{}' must start with a letter and contain only letters, digits, '_' or '-'",
                    self.name
                ),
                "name",
            ));
        }
        if self.name == COMPLETE_TASK_TOOL {
            return Err(DroverError::validation_field(
                format!("agent name '{}' is reserved", COMPLETE_TASK_TOOL),
                "name",
            ));
        }
        if self.run_config.max_turns == Some(0) {
            return Err(DroverError::validation_field(
                "max_turns must be greater than 0",
                "run_config.max_turns",
            ));
        }
        if let Some(minutes) = self.run_config.max_time_minutes {
            if !minutes.is_finite() || minutes <= 0.0 {
                return Err(DroverError::validation_field(
                    "max_time_minutes must be a positive number",
                    "run_config.max_time_minutes",
                ));
            }
        }
        if self.output_config.output_name.trim().is_empty() {
            return Err(DroverError::validation_field(
                "output_name must not be empty",
                "output_config.output_name",
            ));
        }
        if self.tool_config.tools.iter().any(|t| t == COMPLETE_TASK_TOOL) {
            return Err(DroverError::validation_field(
                format!("'{}' is provided automatically and must not be listed", COMPLETE_TASK_TOOL),
                "tool_config.tools",
            ));
        }

        let templates = [
            ("prompt_config.system_prompt", self.prompt_config.system_prompt.as_deref()),
            ("prompt_config.query", self.prompt_config.query.as_deref()),
        ];
        for (field, template) in templates {
            for name in template.map(placeholders).unwrap_or_default() {
                if !self.input_config.inputs.contains_key(&name) {
                    return Err(DroverError::validation_field(
                        format!("template references undeclared input '{}'", name),
                        field,
                    ));
                }
            }
        }

        Ok(())
    }

    /// Declaration of this agent's `complete_task` tool
    pub fn complete_task_schema(&self) -> ToolSchema {
        ToolSchema::new(
            COMPLETE_TASK_TOOL,
            "Call this tool exactly once when the task is finished to submit the final result.",
            vec![ToolParameter::string(
                self.output_config.output_name.clone(),
                self.output_config.description.clone(),
            )],
        )
    }
}

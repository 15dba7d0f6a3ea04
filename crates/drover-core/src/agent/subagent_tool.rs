//! Agents exposed as tools
//!
//! A [`SubagentTool`] lets one agent delegate to another. Each invocation
//! runs a fresh child [`AgentExecutor`] against the same runtime context and
//! reports the child's progress through the parent's partial-output callback.

use std::sync::{Arc, Weak};

use async_trait::async_trait;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use super::executor::{AgentExecutor, RuntimeContext};
use super::types::{AgentDefinition, AgentInputs, RunResult};
use crate::activity::{ActivityEvent, ActivityKind, ActivityStream};
use crate::tools::{
    OutputCallback, Tool, ToolError, ToolInvocation, ToolKind, ToolResult, ToolSchema,
    validate_params,
};

/// A tool that runs an agent definition to completion
pub struct SubagentTool {
    definition: Arc<AgentDefinition>,
    runtime: Weak<RuntimeContext>,
}

impl SubagentTool {
    /// Wrap `definition`; the runtime is held weakly since it owns this tool
    pub fn new(definition: AgentDefinition, runtime: Weak<RuntimeContext>) -> Self {
        Self {
            definition: Arc::new(definition),
            runtime,
        }
    }

    pub fn definition(&self) -> &AgentDefinition {
        &self.definition
    }
}

impl Tool for SubagentTool {
    fn name(&self) -> &str {
        &self.definition.name
    }

    fn display_name(&self) -> &str {
        self.definition.display_name()
    }

    fn description(&self) -> &str {
        &self.definition.description
    }

    fn kind(&self) -> ToolKind {
        ToolKind::Think
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema::new(
            &self.definition.name,
            &self.definition.description,
            self.definition.input_config.to_parameters(),
        )
    }

    fn validate(&self, params: &Value) -> Result<(), ToolError> {
        validate_params(&self.schema(), params)?;
        AgentInputs::from_value(params.clone())
            .and_then(|inputs| inputs.validate(&self.definition.input_config))
            .map_err(|e| ToolError::InvalidParameters(e.to_string()))
    }

    fn create_invocation(&self, params: Value) -> Result<Box<dyn ToolInvocation>, ToolError> {
        let inputs = AgentInputs::from_value(params.clone())
            .map_err(|e| ToolError::InvalidParameters(e.to_string()))?;
        Ok(Box::new(SubagentInvocation {
            definition: self.definition.clone(),
            runtime: self.runtime.clone(),
            params,
            inputs,
        }))
    }
}

struct SubagentInvocation {
    definition: Arc<AgentDefinition>,
    runtime: Weak<RuntimeContext>,
    params: Value,
    inputs: AgentInputs,
}

/// Human readable progress line for a child event, if it has one
fn progress_line(event: &ActivityEvent) -> Option<String> {
    match &event.kind {
        ActivityKind::ThoughtChunk { text } => Some(text.clone()),
        ActivityKind::ToolCallStart {
            name, description, ..
        } => Some(format!("\n[tool] {}: {}\n", name, description)),
        ActivityKind::Error { message, .. } => Some(format!("\n[error] {}\n", message)),
        ActivityKind::ToolCallEnd { .. } => None,
    }
}

fn summarize(name: &str, run: &RunResult) -> String {
    format!(
        "Subagent '{}' finished.\nTermination reason: {}\nResult:\n{}",
        name, run.terminate_reason, run.result
    )
}

#[async_trait]
impl ToolInvocation for SubagentInvocation {
    fn description(&self) -> String {
        let inputs = self
            .params
            .as_object()
            .map(|map| {
                map.iter()
                    .map(|(k, v)| match v {
                        Value::String(s) => format!("{}: {}", k, s),
                        other => format!("{}: {}", k, other),
                    })
                    .collect::<Vec<_>>()
                    .join(", ")
            })
            .unwrap_or_default();
        format!("Running subagent '{}' with inputs: {{ {} }}", self.definition.name, inputs)
    }

    fn params(&self) -> &Value {
        &self.params
    }

    async fn execute(
        &self,
        cancel: CancellationToken,
        on_partial_output: Option<OutputCallback>,
    ) -> Result<ToolResult, ToolError> {
        let runtime = self.runtime.upgrade().ok_or_else(|| {
            ToolError::ExecutionFailed("agent runtime is no longer available".to_string())
        })?;

        let activity = match on_partial_output {
            Some(callback) => ActivityStream::from_callback(move |event: ActivityEvent| {
                if let Some(line) = progress_line(&event) {
                    callback(&line);
                }
            }),
            None => ActivityStream::discard(),
        };

        let executor = AgentExecutor::create(self.definition.as_ref().clone(), runtime, activity)
            .await
            .map_err(|e| ToolError::ExecutionFailed(e.to_string()))?;
        tracing::debug!(
            agent = %self.definition.name,
            run_id = %executor.run_id(),
            "Starting subagent"
        );

        let run = executor
            .run(self.inputs.clone(), cancel.child_token())
            .await
            .map_err(|e| ToolError::InvalidParameters(e.to_string()))?;

        if cancel.is_cancelled() {
            return Err(ToolError::Cancelled);
        }

        let summary = summarize(&self.definition.name, &run);
        Ok(ToolResult::with_display(summary, run.result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::ToolErrorInfo;
    use crate::tools::ToolErrorType;
    use serde_json::json;

    #[test]
    fn test_progress_lines() {
        let thought = ActivityEvent::thought("a", "thinking");
        assert_eq!(progress_line(&thought).as_deref(), Some("thinking"));

        let start = ActivityEvent::tool_start("a", "c1", "read_file", json!({}), "Reading x");
        assert_eq!(
            progress_line(&start).as_deref(),
            Some("\n[tool] read_file: Reading x\n")
        );

        let end = ActivityEvent::tool_end("a", "c1", "read_file", "ok");
        assert!(progress_line(&end).is_none());

        let error = ActivityEvent::tool_error(
            "a",
            "c1",
            "read_file",
            ToolErrorInfo {
                message: "boom".to_string(),
                error_type: ToolErrorType::ExecutionFailed,
            },
        );
        assert_eq!(progress_line(&error).as_deref(), Some("\n[error] boom\n"));
    }
}

//! The turn loop

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use serde_json::Value;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use super::context::RuntimeContext;
use crate::activity::{ActivityEvent, ActivityStream};
use crate::agent::types::{
    AgentDefinition, AgentInputs, COMPLETE_TASK_TOOL, RunResult, TerminateReason, render_template,
};
use crate::error::{DroverError, DroverResult};
use crate::llm::{Content, ModelEvent, ModelRequest, Part};
use crate::tools::{ToolCallRequestInfo, ToolErrorType, ToolResult, ToolSchema};

/// Drives one run of one agent definition
///
/// Executors are single-use: [`AgentExecutor::run`] consumes the executor.
pub struct AgentExecutor {
    pub(super) definition: AgentDefinition,
    pub(super) runtime: Arc<RuntimeContext>,
    pub(super) activity: ActivityStream,
    declarations: Vec<ToolSchema>,
    run_id: String,
    max_turns: u32,
    max_time: Duration,
    pub(super) parallel: bool,
    initial_history: Vec<Content>,
}

/// Upper bound on a run's wall-clock budget
pub(super) const MAX_RUN_TIME: Duration = Duration::from_secs(86400 * 365 * 30);

/// Budget for `minutes`, capped at [`MAX_RUN_TIME`]
pub(super) fn run_time_budget(minutes: f64) -> Duration {
    Duration::try_from_secs_f64(minutes * 60.0)
        .map(|budget| budget.min(MAX_RUN_TIME))
        .unwrap_or(MAX_RUN_TIME)
}

/// A future raced against cancellation and the run deadline
enum Bounded<T> {
    Done(T),
    Cancelled,
    TimedOut,
}

async fn bounded<F: Future>(cancel: &CancellationToken, deadline: Instant, fut: F) -> Bounded<F::Output> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Bounded::Cancelled,
        _ = tokio::time::sleep_until(deadline) => Bounded::TimedOut,
        out = fut => Bounded::Done(out),
    }
}

/// What the model produced in one turn
struct ModelTurn {
    text: String,
    calls: Vec<ToolCallRequestInfo>,
}

impl AgentExecutor {
    /// Create an executor for `definition`
    ///
    /// Fails with a validation error for a malformed definition and with an
    /// agent-init error if any tool the definition lists is not registered.
    pub async fn create(
        definition: AgentDefinition,
        runtime: Arc<RuntimeContext>,
        activity: ActivityStream,
    ) -> DroverResult<Self> {
        definition.validate()?;

        let registry = runtime.tool_registry();
        let missing: Vec<&str> = definition
            .tool_config
            .tools
            .iter()
            .filter(|name| !registry.has_tool(name))
            .map(String::as_str)
            .collect();
        if !missing.is_empty() {
            return Err(DroverError::agent_init(
                &definition.name,
                format!("required tools are not registered: {}", missing.join(", ")),
            ));
        }

        let mut declarations = registry.declarations(&definition.tool_config.tools);
        declarations.push(definition.complete_task_schema());

        let defaults = runtime.agents_config();
        let max_turns = definition
            .run_config
            .max_turns
            .unwrap_or(defaults.default_max_turns);
        let max_minutes = definition
            .run_config
            .max_time_minutes
            .unwrap_or(defaults.default_max_time_minutes);
        let parallel = definition
            .run_config
            .parallel_tool_calls
            .unwrap_or(runtime.tools_config().parallel_tool_calls);

        let run_id = format!(
            "{}-{}",
            definition.name,
            &uuid::Uuid::new_v4().simple().to_string()[..8]
        );

        tracing::debug!(
            agent = %definition.name,
            run_id = %run_id,
            tools = declarations.len(),
            "Created agent executor"
        );

        Ok(Self {
            definition,
            runtime,
            activity,
            declarations,
            run_id,
            max_turns,
            max_time: run_time_budget(max_minutes),
            parallel,
            initial_history: Vec::new(),
        })
    }

    /// Continue from an earlier conversation, e.g. one restored from a checkpoint
    pub fn with_history(mut self, history: Vec<Content>) -> Self {
        self.initial_history = history;
        self
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn definition(&self) -> &AgentDefinition {
        &self.definition
    }

    /// Run the agent to a terminal state
    ///
    /// Returns `Err` only when `inputs` fail validation; every other outcome,
    /// including transport failures and cancellation, is a [`RunResult`].
    #[tracing::instrument(
        name = "agent_run",
        skip_all,
        fields(agent = %self.definition.name, run_id = %self.run_id)
    )]
    pub async fn run(self, inputs: AgentInputs, cancel: CancellationToken) -> DroverResult<RunResult> {
        let input_config = &self.definition.input_config;
        inputs.validate(input_config)?;
        let system_instruction = self
            .definition
            .prompt_config
            .system_prompt
            .as_deref()
            .map(|template| render_template(template, &inputs, input_config))
            .transpose()?;
        let query = render_template(
            self.definition.prompt_config.query_template(),
            &inputs,
            input_config,
        )?;

        let mut history = self.initial_history.clone();
        history.push(Content::user_text(query));

        let started = Instant::now();
        let deadline = started
            .checked_add(self.max_time)
            .unwrap_or_else(|| started + Duration::from_secs(86400 * 365));
        let mut turns: u32 = 0;
        let mut partial = String::new();

        tracing::info!(
            max_turns = self.max_turns,
            max_time_secs = self.max_time.as_secs_f64(),
            parallel = self.parallel,
            "Agent run started"
        );

        loop {
            if cancel.is_cancelled() {
                return Ok(self.finish(TerminateReason::Aborted, partial, turns, history));
            }
            if turns >= self.max_turns {
                return Ok(self.finish(TerminateReason::MaxTurns, partial, turns, history));
            }
            if Instant::now() >= deadline {
                return Ok(self.finish(TerminateReason::MaxTime, partial, turns, history));
            }

            turns += 1;
            let turn = self.call_model(&history, system_instruction.as_deref(), turns, &cancel);
            let turn = match bounded(&cancel, deadline, turn).await {
                Bounded::Done(Ok(turn)) => turn,
                Bounded::Done(Err(e)) => {
                    tracing::error!(turn = turns, error = %e, "Model stream failed");
                    self.activity
                        .emit(ActivityEvent::run_error(&self.definition.name, e.to_string()));
                    return Ok(self.finish(TerminateReason::Error, e.to_string(), turns, history));
                }
                Bounded::Cancelled => {
                    return Ok(self.finish(TerminateReason::Aborted, partial, turns, history));
                }
                Bounded::TimedOut => {
                    return Ok(self.finish(TerminateReason::MaxTime, partial, turns, history));
                }
            };

            if !turn.text.trim().is_empty() {
                partial = turn.text.clone();
            }

            let mut parts = Vec::with_capacity(turn.calls.len() + 1);
            if !turn.text.is_empty() {
                parts.push(Part::Text(turn.text.clone()));
            }
            parts.extend(turn.calls.iter().map(Part::function_call));
            history.push(Content::model(parts));

            if turn.calls.is_empty() {
                if turn.text.trim().is_empty() {
                    let message = "Model returned an empty response".to_string();
                    self.activity
                        .emit(ActivityEvent::run_error(&self.definition.name, message.clone()));
                    return Ok(self.finish(TerminateReason::Error, message, turns, history));
                }
                return Ok(self.finish(TerminateReason::Goal, turn.text, turns, history));
            }

            let work: Vec<ToolCallRequestInfo> = turn
                .calls
                .iter()
                .filter(|call| call.name != COMPLETE_TASK_TOOL)
                .cloned()
                .collect();

            let turn_cancel = cancel.child_token();
            let dispatched = match bounded(&cancel, deadline, self.dispatch_calls(&work, &turn_cancel)).await {
                Bounded::Done(outcome) => outcome,
                Bounded::Cancelled => {
                    turn_cancel.cancel();
                    return Ok(self.finish(TerminateReason::Aborted, partial, turns, history));
                }
                Bounded::TimedOut => {
                    turn_cancel.cancel();
                    return Ok(self.finish(TerminateReason::MaxTime, partial, turns, history));
                }
            };

            if let Some(reason) = dispatched.fatal_denial {
                tracing::warn!(reason = %reason, "Confirmation denied and denials are fatal");
                return Ok(self.finish(TerminateReason::Aborted, reason, turns, history));
            }

            let mut work_results = dispatched.results.into_iter();
            let mut responses = Vec::with_capacity(turn.calls.len());
            let mut completion = None;

            for call in &turn.calls {
                let result = if call.name == COMPLETE_TASK_TOOL {
                    match self.completion_output(call) {
                        Ok(output) => {
                            completion.get_or_insert(output);
                            ToolResult::success("Task marked complete.")
                        }
                        Err(message) => ToolResult::error(ToolErrorType::InvalidParameters, message),
                    }
                } else {
                    work_results.next().unwrap_or_else(|| {
                        ToolResult::error(ToolErrorType::ExecutionFailed, "Result not found")
                    })
                };
                responses.push(Part::function_response(call, &result));
            }
            history.push(Content::user(responses));

            if let Some(output) = completion {
                return Ok(self.finish(TerminateReason::Goal, output, turns, history));
            }
        }
    }

    /// Stream one model reply, emitting thought chunks as they arrive
    #[tracing::instrument(name = "model_turn", skip_all, fields(turn = turn))]
    async fn call_model(
        &self,
        history: &[Content],
        system_instruction: Option<&str>,
        turn: u32,
        cancel: &CancellationToken,
    ) -> DroverResult<ModelTurn> {
        let request = ModelRequest {
            model_config: self.definition.model_config.clone(),
            system_instruction: system_instruction.map(str::to_string),
            history: history.to_vec(),
            tools: self.declarations.clone(),
        };
        let request_id = format!("{}#{}", self.run_id, turn);

        let mut stream = self
            .runtime
            .model_client()
            .send_message_stream(request, cancel.clone(), &request_id)
            .await?;

        let mut text = String::new();
        let mut calls: Vec<ToolCallRequestInfo> = Vec::new();

        while let Some(event) = stream.next().await {
            match event? {
                ModelEvent::Content(chunk) => {
                    if chunk.is_empty() {
                        continue;
                    }
                    self.activity
                        .emit(ActivityEvent::thought(&self.definition.name, chunk.as_str()));
                    text.push_str(&chunk);
                }
                ModelEvent::ToolCallRequest(mut call) => {
                    if call.call_id.is_empty() {
                        call.call_id = format!("{}-{}", request_id, calls.len());
                    }
                    calls.push(call);
                }
            }
        }

        tracing::debug!(chars = text.len(), tool_calls = calls.len(), "Model turn finished");
        Ok(ModelTurn { text, calls })
    }

    /// The value submitted through `complete_task`
    fn completion_output(&self, call: &ToolCallRequestInfo) -> Result<String, String> {
        let name = &self.definition.output_config.output_name;
        match call.args.get(name) {
            Some(Value::String(s)) if !s.trim().is_empty() => Ok(s.clone()),
            Some(Value::Null) | None => Err(format!(
                "Missing required argument '{}' for {}",
                name, COMPLETE_TASK_TOOL
            )),
            Some(Value::String(_)) => Err(format!(
                "Argument '{}' for {} must not be empty",
                name, COMPLETE_TASK_TOOL
            )),
            Some(other) => Ok(other.to_string()),
        }
    }

    fn finish(
        &self,
        reason: TerminateReason,
        result: String,
        turns: u32,
        history: Vec<Content>,
    ) -> RunResult {
        tracing::info!(reason = %reason, turns = turns, "Agent run finished");
        RunResult {
            result,
            terminate_reason: reason,
            turns,
            run_id: self.run_id.clone(),
            history,
        }
    }
}

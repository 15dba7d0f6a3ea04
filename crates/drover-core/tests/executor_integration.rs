//! Integration tests for the agent executor driven by a scripted model

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use drover_core::activity::{ActivityKind, ActivityStream};
use drover_core::agent::{
    AgentDefinition, AgentExecutor, AgentInputs, AgentRegistry, InputConfig, InputSpec, InputType,
    RunConfig, RuntimeContext, TerminateReason,
};
use drover_core::approval::{
    ApprovalStore, CallbackHandler, ConfirmationDetails, ConfirmationGate, ConfirmationOutcome,
};
use drover_core::config::EngineConfig;
use drover_core::llm::{Part, ScriptedModelClient, ScriptedTurn, SharedModelClient};
use drover_core::storage::{MemoryStorage, SharedStorage};
use drover_core::tools::{
    OutputCallback, Tool, ToolError, ToolInvocation, ToolKind, ToolParameter, ToolRegistry,
    ToolResult, ToolSchema,
};
use parking_lot::Mutex;
use serde_json::{Value, json};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Sleeps for `ms` milliseconds, then returns `label`
#[derive(Default)]
struct SleepTool {
    started: Arc<AtomicUsize>,
    tokens: Arc<Mutex<Vec<CancellationToken>>>,
}

struct SleepInvocation {
    params: Value,
    started: Arc<AtomicUsize>,
    tokens: Arc<Mutex<Vec<CancellationToken>>>,
}

impl Tool for SleepTool {
    fn name(&self) -> &str {
        "sleep"
    }

    fn description(&self) -> &str {
        "Wait, then answer"
    }

    fn kind(&self) -> ToolKind {
        ToolKind::Other
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema::new(
            "sleep",
            "Wait, then answer",
            vec![
                ToolParameter::integer("ms", "Milliseconds to wait"),
                ToolParameter::string("label", "Answer"),
            ],
        )
    }

    fn create_invocation(&self, params: Value) -> Result<Box<dyn ToolInvocation>, ToolError> {
        Ok(Box::new(SleepInvocation {
            params,
            started: self.started.clone(),
            tokens: self.tokens.clone(),
        }))
    }
}

#[async_trait]
impl ToolInvocation for SleepInvocation {
    fn description(&self) -> String {
        format!("sleep {}ms", self.params["ms"])
    }

    fn params(&self) -> &Value {
        &self.params
    }

    async fn execute(
        &self,
        cancel: CancellationToken,
        _on_partial_output: Option<OutputCallback>,
    ) -> Result<ToolResult, ToolError> {
        self.started.fetch_add(1, Ordering::SeqCst);
        self.tokens.lock().push(cancel.clone());
        let ms = self.params["ms"].as_u64().unwrap_or(0);
        tokio::select! {
            _ = cancel.cancelled() => Err(ToolError::Cancelled),
            _ = tokio::time::sleep(Duration::from_millis(ms)) => {
                Ok(ToolResult::success(self.params["label"].as_str().unwrap_or_default()))
            }
        }
    }
}

/// Needs confirmation before it writes anything
struct WriteTool {
    writes: Arc<AtomicUsize>,
}

struct WriteInvocation {
    params: Value,
    writes: Arc<AtomicUsize>,
}

impl Tool for WriteTool {
    fn name(&self) -> &str {
        "write_note"
    }

    fn description(&self) -> &str {
        "Write a note"
    }

    fn kind(&self) -> ToolKind {
        ToolKind::Edit
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema::new(
            "write_note",
            "Write a note",
            vec![ToolParameter::string("text", "Note text")],
        )
    }

    fn create_invocation(&self, params: Value) -> Result<Box<dyn ToolInvocation>, ToolError> {
        Ok(Box::new(WriteInvocation {
            params,
            writes: self.writes.clone(),
        }))
    }
}

#[async_trait]
impl ToolInvocation for WriteInvocation {
    fn description(&self) -> String {
        "write a note".to_string()
    }

    fn params(&self) -> &Value {
        &self.params
    }

    fn confirmation_details(&self) -> Option<ConfirmationDetails> {
        Some(ConfirmationDetails::for_tool("write_note", "Write a note?"))
    }

    async fn execute(
        &self,
        _cancel: CancellationToken,
        _on_partial_output: Option<OutputCallback>,
    ) -> Result<ToolResult, ToolError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(ToolResult::success("written"))
    }
}

fn sleep_call(ms: u64, label: &str) -> Value {
    json!({ "ms": ms, "label": label })
}

fn worker(tools: &[&str]) -> AgentDefinition {
    AgentDefinition::new("worker", "Does work with tools")
        .with_tools(tools.iter().copied())
        .with_prompts("You work.", "Start working")
}

fn runtime_with(client: &Arc<ScriptedModelClient>, registry: ToolRegistry) -> Arc<RuntimeContext> {
    let model: SharedModelClient = client.clone();
    RuntimeContext::builder(model)
        .with_tool_registry(Arc::new(registry))
        .build()
}

fn output_of(parts: &[Part], id: &str) -> Value {
    parts
        .iter()
        .find_map(|part| match part {
            Part::FunctionResponse { id: part_id, response, .. } if part_id == id => Some(response.clone()),
            _ => None,
        })
        .unwrap_or(Value::Null)
}

#[tokio::test(start_paused = true)]
async fn test_parallel_calls_run_concurrently_and_keep_request_order() {
    let client = Arc::new(ScriptedModelClient::new(vec![
        ScriptedTurn::new()
            .with_tool_call("c1", "sleep", sleep_call(300, "slow"))
            .with_tool_call("c2", "sleep", sleep_call(10, "fast"))
            .with_tool_call("c3", "sleep", sleep_call(100, "medium")),
        ScriptedTurn::new().with_tool_call("c4", "complete_task", json!({ "result": "done" })),
    ]));
    let registry = ToolRegistry::new();
    registry.register(Arc::new(SleepTool::default()));
    let runtime = runtime_with(&client, registry);

    let def = worker(&["sleep"]).with_run_config(RunConfig {
        parallel_tool_calls: Some(true),
        ..RunConfig::default()
    });
    let (stream, mut receiver) = ActivityStream::channel();
    let executor = AgentExecutor::create(def, runtime, stream).await.unwrap();

    let started = Instant::now();
    let result = executor.run(AgentInputs::new(), CancellationToken::new()).await.unwrap();
    let elapsed = started.elapsed();

    assert_eq!(result.terminate_reason, TerminateReason::Goal);
    assert!(elapsed < Duration::from_millis(400), "took {:?}", elapsed);

    let responses = &result.history[2].parts;
    let ids: Vec<&str> = responses
        .iter()
        .filter_map(|p| match p {
            Part::FunctionResponse { id, .. } => Some(id.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(ids, ["c1", "c2", "c3"]);
    assert_eq!(output_of(responses, "c1"), json!({ "output": "slow" }));
    assert_eq!(output_of(responses, "c2"), json!({ "output": "fast" }));

    let finished: Vec<String> = receiver
        .drain()
        .into_iter()
        .filter_map(|e| match e.kind {
            ActivityKind::ToolCallEnd { call_id, .. } => Some(call_id),
            _ => None,
        })
        .collect();
    assert_eq!(finished, ["c2", "c3", "c1"]);
}

#[tokio::test(start_paused = true)]
async fn test_sequential_calls_run_one_after_another() {
    let client = Arc::new(ScriptedModelClient::new(vec![
        ScriptedTurn::new()
            .with_tool_call("c1", "sleep", sleep_call(100, "a"))
            .with_tool_call("c2", "sleep", sleep_call(100, "b")),
        ScriptedTurn::text("done"),
    ]));
    let registry = ToolRegistry::new();
    registry.register(Arc::new(SleepTool::default()));
    let runtime = runtime_with(&client, registry);

    let executor = AgentExecutor::create(worker(&["sleep"]), runtime, ActivityStream::discard())
        .await
        .unwrap();
    let started = Instant::now();
    let result = executor.run(AgentInputs::new(), CancellationToken::new()).await.unwrap();

    assert_eq!(result.terminate_reason, TerminateReason::Goal);
    assert!(started.elapsed() >= Duration::from_millis(200));
}

#[tokio::test]
async fn test_cancelled_before_start_is_aborted_without_work() {
    let client = Arc::new(ScriptedModelClient::repeating(
        ScriptedTurn::new().with_tool_call("", "sleep", sleep_call(1, "x")),
    ));
    let tool = SleepTool::default();
    let started = tool.started.clone();
    let registry = ToolRegistry::new();
    registry.register(Arc::new(tool));
    let runtime = runtime_with(&client, registry);

    let cancel = CancellationToken::new();
    cancel.cancel();
    let executor = AgentExecutor::create(worker(&["sleep"]), runtime, ActivityStream::discard())
        .await
        .unwrap();
    let result = executor.run(AgentInputs::new(), cancel).await.unwrap();

    assert_eq!(result.terminate_reason, TerminateReason::Aborted);
    assert_eq!(result.turns, 0);
    assert_eq!(client.call_count(), 0);
    assert_eq!(started.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn test_cancel_during_model_stream_runs_no_tools() {
    let client = Arc::new(ScriptedModelClient::new(vec![
        ScriptedTurn::new()
            .with_text("planning")
            .with_tool_call("c1", "sleep", sleep_call(1, "x"))
            .with_delay(Duration::from_secs(1)),
    ]));
    let tool = SleepTool::default();
    let started = tool.started.clone();
    let registry = ToolRegistry::new();
    registry.register(Arc::new(tool));
    let runtime = runtime_with(&client, registry);

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(1500)).await;
        trigger.cancel();
    });

    let executor = AgentExecutor::create(worker(&["sleep"]), runtime, ActivityStream::discard())
        .await
        .unwrap();
    let result = executor.run(AgentInputs::new(), cancel).await.unwrap();

    assert_eq!(result.terminate_reason, TerminateReason::Aborted);
    assert_eq!(started.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn test_cancel_during_tool_execution_aborts_promptly() {
    let client = Arc::new(ScriptedModelClient::new(vec![
        ScriptedTurn::new().with_tool_call("c1", "sleep", sleep_call(60_000, "late")),
    ]));
    let tool = SleepTool::default();
    let tokens = tool.tokens.clone();
    let registry = ToolRegistry::new();
    registry.register(Arc::new(tool));
    let runtime = runtime_with(&client, registry);

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        trigger.cancel();
    });

    let executor = AgentExecutor::create(worker(&["sleep"]), runtime, ActivityStream::discard())
        .await
        .unwrap();
    let started = Instant::now();
    let result = executor.run(AgentInputs::new(), cancel).await.unwrap();

    assert_eq!(result.terminate_reason, TerminateReason::Aborted);
    assert!(started.elapsed() < Duration::from_secs(1));
    assert!(tokens.lock().iter().all(|t| t.is_cancelled()));
}

#[tokio::test(start_paused = true)]
async fn test_wall_clock_budget_ends_slow_model_turn() {
    let client = Arc::new(ScriptedModelClient::repeating(
        ScriptedTurn::text("still thinking").with_delay(Duration::from_secs(60)),
    ));
    let runtime = runtime_with(&client, ToolRegistry::new());
    let def = worker(&[]).with_run_config(RunConfig {
        max_time_minutes: Some(0.01),
        ..RunConfig::default()
    });

    let executor = AgentExecutor::create(def, runtime, ActivityStream::discard()).await.unwrap();
    let started = Instant::now();
    let result = executor.run(AgentInputs::new(), CancellationToken::new()).await.unwrap();

    assert_eq!(result.terminate_reason, TerminateReason::MaxTime);
    assert!(started.elapsed() < Duration::from_secs(60));
}

#[tokio::test(start_paused = true)]
async fn test_wall_clock_budget_ends_slow_tool() {
    let client = Arc::new(ScriptedModelClient::new(vec![
        ScriptedTurn::new().with_tool_call("c1", "sleep", sleep_call(3_600_000, "late")),
    ]));
    let registry = ToolRegistry::new();
    registry.register(Arc::new(SleepTool::default()));
    let runtime = runtime_with(&client, registry);
    let def = worker(&["sleep"]).with_run_config(RunConfig {
        max_time_minutes: Some(0.5),
        ..RunConfig::default()
    });

    let executor = AgentExecutor::create(def, runtime, ActivityStream::discard()).await.unwrap();
    let result = executor.run(AgentInputs::new(), CancellationToken::new()).await.unwrap();

    assert_eq!(result.terminate_reason, TerminateReason::MaxTime);
    assert_eq!(result.turns, 1);
}

#[tokio::test]
async fn test_transport_failure_ends_run_with_error() {
    let client = Arc::new(ScriptedModelClient::new(vec![
        ScriptedTurn::text("partial").failing_mid_stream("connection reset"),
    ]));
    let runtime = runtime_with(&client, ToolRegistry::new());
    let (stream, mut receiver) = ActivityStream::channel();

    let executor = AgentExecutor::create(worker(&[]), runtime, stream).await.unwrap();
    let result = executor.run(AgentInputs::new(), CancellationToken::new()).await.unwrap();

    assert_eq!(result.terminate_reason, TerminateReason::Error);
    assert!(result.result.contains("connection reset"));
    let types: Vec<&str> = receiver.drain().iter().map(|e| e.type_name()).collect();
    assert_eq!(types, ["THOUGHT_CHUNK", "ERROR"]);
}

#[tokio::test(start_paused = true)]
async fn test_fatal_denial_cancels_sibling_calls() {
    let client = Arc::new(ScriptedModelClient::new(vec![
        ScriptedTurn::new()
            .with_tool_call("c1", "sleep", sleep_call(60_000, "late"))
            .with_tool_call("c2", "write_note", json!({ "text": "hi" })),
        ScriptedTurn::text("unreachable"),
    ]));
    let sleep = SleepTool::default();
    let tokens = sleep.tokens.clone();
    let writes = Arc::new(AtomicUsize::new(0));
    let registry = ToolRegistry::new();
    registry.register(Arc::new(sleep));
    registry.register(Arc::new(WriteTool { writes: writes.clone() }));
    let runtime = runtime_with(&client, registry);

    let def = worker(&["sleep", "write_note"]).with_run_config(RunConfig {
        parallel_tool_calls: Some(true),
        deny_is_fatal: true,
        ..RunConfig::default()
    });
    let executor = AgentExecutor::create(def, runtime, ActivityStream::discard()).await.unwrap();
    let started = Instant::now();
    let result = executor.run(AgentInputs::new(), CancellationToken::new()).await.unwrap();

    assert_eq!(result.terminate_reason, TerminateReason::Aborted);
    assert!(started.elapsed() < Duration::from_secs(60));
    assert_eq!(writes.load(Ordering::SeqCst), 0);
    assert_eq!(client.call_count(), 1);
    assert!(tokens.lock().iter().all(|t| t.is_cancelled()));
}

#[tokio::test]
async fn test_allow_and_remember_skips_later_prompts() {
    let prompts = Arc::new(AtomicUsize::new(0));
    let counter = prompts.clone();
    let handler = CallbackHandler::new(move |_request: &drover_core::approval::ConfirmationRequest| {
        counter.fetch_add(1, Ordering::SeqCst);
        ConfirmationOutcome::AllowAndRemember
    });

    let client = Arc::new(ScriptedModelClient::new(vec![
        ScriptedTurn::new().with_tool_call("c1", "write_note", json!({ "text": "one" })),
        ScriptedTurn::text("first done"),
        ScriptedTurn::new().with_tool_call("c2", "write_note", json!({ "text": "two" })),
        ScriptedTurn::text("second done"),
    ]));
    let writes = Arc::new(AtomicUsize::new(0));
    let registry = ToolRegistry::new();
    registry.register(Arc::new(WriteTool { writes: writes.clone() }));

    let storage: SharedStorage = Arc::new(MemoryStorage::new());
    let store = Arc::new(ApprovalStore::new(storage));
    let model: SharedModelClient = client.clone();
    let runtime = RuntimeContext::builder(model)
        .with_tool_registry(Arc::new(registry))
        .with_gate(ConfirmationGate::new(store.clone()).with_handler(Arc::new(handler)))
        .build();

    for _ in 0..2 {
        let executor = AgentExecutor::create(worker(&["write_note"]), runtime.clone(), ActivityStream::discard())
            .await
            .unwrap();
        let result = executor.run(AgentInputs::new(), CancellationToken::new()).await.unwrap();
        assert_eq!(result.terminate_reason, TerminateReason::Goal);
    }

    assert_eq!(prompts.load(Ordering::SeqCst), 1);
    assert_eq!(writes.load(Ordering::SeqCst), 2);
    let rules = tokio_test::assert_ok!(store.list_rules().await);
    assert_eq!(rules.len(), 1);
    assert!(rules[0].last_used.is_some());
}

#[tokio::test]
async fn test_runtime_from_config_persists_rules_to_state_file() {
    let dir = tempfile::TempDir::new().unwrap();
    let mut config = EngineConfig::default();
    config.storage.state_dir = dir.path().to_path_buf();
    config.agents.directories = Vec::new();

    let client = Arc::new(ScriptedModelClient::new(vec![
        ScriptedTurn::new().with_tool_call("c1", "write_note", json!({ "text": "one" })),
        ScriptedTurn::text("done"),
    ]));
    let model: SharedModelClient = client.clone();
    let handler = CallbackHandler::new(|_request: &drover_core::approval::ConfirmationRequest| {
        ConfirmationOutcome::AllowAndRemember
    });
    let runtime = tokio_test::assert_ok!(RuntimeContext::from_config(
        &config,
        model,
        Some(Arc::new(handler))
    ));
    runtime.tool_registry().register(Arc::new(WriteTool {
        writes: Arc::new(AtomicUsize::new(0)),
    }));

    let executor = AgentExecutor::create(worker(&["write_note"]), runtime.clone(), ActivityStream::discard())
        .await
        .unwrap();
    executor.run(AgentInputs::new(), CancellationToken::new()).await.unwrap();

    let state = std::fs::read_to_string(dir.path().join("state.json")).unwrap();
    let state: Value = serde_json::from_str(&state).unwrap();
    let rules = state["approval_rules"].as_array().unwrap();
    assert_eq!(rules.len(), 1);
    assert_eq!(rules[0]["type"], "tool_name");
    assert_eq!(rules[0]["value"], "write_note");
}

fn helper_agent() -> AgentDefinition {
    AgentDefinition::new("helper", "Answers focused sub-questions")
        .with_input_config(
            InputConfig::default().with_input("task", InputSpec::required(InputType::String, "Task to do")),
        )
        .with_prompts("You help.", "Do: ${task}")
}

#[tokio::test]
async fn test_subagent_runs_as_tool_and_streams_progress() {
    let client = Arc::new(ScriptedModelClient::new(vec![
        ScriptedTurn::new().with_tool_call("p1", "helper", json!({ "task": "count files" })),
        ScriptedTurn::text("there are 3 files"),
        ScriptedTurn::new().with_tool_call("p2", "complete_task", json!({ "result": "3" })),
    ]));
    let agents = AgentRegistry::new();
    assert!(agents.register_agent(helper_agent()));
    let model: SharedModelClient = client.clone();
    let runtime = RuntimeContext::builder(model)
        .with_agent_registry(Arc::new(agents))
        .build();
    assert_eq!(runtime.register_subagents(), 1);
    assert_eq!(runtime.tool_registry().get("helper").unwrap().kind(), ToolKind::Think);

    let parent = AgentDefinition::new("lead", "Delegates work")
        .with_tools(["helper"])
        .with_prompts("You lead.", "Count the files");
    let (stream, mut receiver) = ActivityStream::channel();
    let executor = AgentExecutor::create(parent, runtime, stream).await.unwrap();
    let result = executor.run(AgentInputs::new(), CancellationToken::new()).await.unwrap();

    assert_eq!(result.terminate_reason, TerminateReason::Goal);
    assert_eq!(result.result, "3");

    let requests = client.requests();
    assert_eq!(requests[1].history[0].text(), "Do: count files");
    assert_eq!(requests[1].system_instruction.as_deref(), Some("You help."));

    let output = output_of(&result.history[2].parts, "p1");
    let output = output["output"].as_str().unwrap();
    assert!(output.contains("Subagent 'helper' finished"));
    assert!(output.contains("GOAL"));
    assert!(output.contains("there are 3 files"));

    let progress: Vec<String> = receiver
        .drain()
        .into_iter()
        .filter(|e| e.agent_name == "helper")
        .filter_map(|e| match e.kind {
            ActivityKind::ThoughtChunk { text } => Some(text),
            _ => None,
        })
        .collect();
    assert_eq!(progress, ["there are 3 files"]);
}

#[tokio::test]
async fn test_subagent_rejects_invalid_inputs_without_running() {
    let client = Arc::new(ScriptedModelClient::new(vec![
        ScriptedTurn::new().with_tool_call("p1", "helper", json!({ "task": 5 })),
        ScriptedTurn::text("ok"),
    ]));
    let agents = AgentRegistry::new();
    agents.register_agent(helper_agent());
    let model: SharedModelClient = client.clone();
    let runtime = RuntimeContext::builder(model)
        .with_agent_registry(Arc::new(agents))
        .build();
    runtime.register_subagents();

    let parent = AgentDefinition::new("lead", "Delegates work").with_tools(["helper"]);
    let executor = AgentExecutor::create(parent, runtime, ActivityStream::discard()).await.unwrap();
    let result = executor.run(AgentInputs::new(), CancellationToken::new()).await.unwrap();

    assert_eq!(output_of(&result.history[2].parts, "p1")["errorType"], "INVALID_PARAMETERS");
    assert_eq!(client.call_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_cancelling_parent_cancels_subagent_tools() {
    let client = Arc::new(ScriptedModelClient::new(vec![
        ScriptedTurn::new().with_tool_call("p1", "helper", json!({ "task": "wait" })),
        ScriptedTurn::new().with_tool_call("h1", "sleep", sleep_call(60_000, "late")),
    ]));
    let sleep = SleepTool::default();
    let started = sleep.started.clone();
    let tokens = sleep.tokens.clone();
    let registry = ToolRegistry::new();
    registry.register(Arc::new(sleep));

    let agents = AgentRegistry::new();
    agents.register_agent(helper_agent().with_tools(["sleep"]));
    let model: SharedModelClient = client.clone();
    let runtime = RuntimeContext::builder(model)
        .with_tool_registry(Arc::new(registry))
        .with_agent_registry(Arc::new(agents))
        .build();
    runtime.register_subagents();

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        trigger.cancel();
    });

    let parent = AgentDefinition::new("lead", "Delegates work").with_tools(["helper"]);
    let executor = AgentExecutor::create(parent, runtime, ActivityStream::discard()).await.unwrap();
    let begun = Instant::now();
    let result = executor.run(AgentInputs::new(), cancel).await.unwrap();

    assert_eq!(result.terminate_reason, TerminateReason::Aborted);
    assert!(begun.elapsed() < Duration::from_secs(60));
    assert_eq!(started.load(Ordering::SeqCst), 1);
    assert!(tokens.lock().iter().all(|t| t.is_cancelled()));
}

/// Proxied from an MCP server but builds plain tool confirmation details
struct McpQueryTool {
    queries: Arc<AtomicUsize>,
}

struct McpQueryInvocation {
    params: Value,
    queries: Arc<AtomicUsize>,
}

impl Tool for McpQueryTool {
    fn name(&self) -> &str {
        "mcp_query"
    }

    fn description(&self) -> &str {
        "Query a remote server"
    }

    fn kind(&self) -> ToolKind {
        ToolKind::Fetch
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema::new(
            "mcp_query",
            "Query a remote server",
            vec![ToolParameter::string("query", "Query text")],
        )
    }

    fn mcp_server(&self) -> Option<&str> {
        Some("github")
    }

    fn create_invocation(&self, params: Value) -> Result<Box<dyn ToolInvocation>, ToolError> {
        Ok(Box::new(McpQueryInvocation {
            params,
            queries: self.queries.clone(),
        }))
    }
}

#[async_trait]
impl ToolInvocation for McpQueryInvocation {
    fn description(&self) -> String {
        "query github".to_string()
    }

    fn params(&self) -> &Value {
        &self.params
    }

    fn confirmation_details(&self) -> Option<ConfirmationDetails> {
        Some(ConfirmationDetails::for_tool("mcp_query", "Run query?"))
    }

    async fn execute(
        &self,
        _cancel: CancellationToken,
        _on_partial_output: Option<OutputCallback>,
    ) -> Result<ToolResult, ToolError> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        Ok(ToolResult::success("3 issues"))
    }
}

fn mcp_runtime(
    client: &Arc<ScriptedModelClient>,
    store: Arc<ApprovalStore>,
    gate_handler: Option<Arc<dyn drover_core::approval::ConfirmationHandler>>,
) -> (Arc<RuntimeContext>, Arc<AtomicUsize>) {
    let queries = Arc::new(AtomicUsize::new(0));
    let registry = ToolRegistry::new();
    registry.register(Arc::new(McpQueryTool { queries: queries.clone() }));
    let mut gate = ConfirmationGate::new(store);
    if let Some(handler) = gate_handler {
        gate = gate.with_handler(handler);
    }
    let model: SharedModelClient = client.clone();
    let runtime = RuntimeContext::builder(model)
        .with_tool_registry(Arc::new(registry))
        .with_gate(gate)
        .build();
    (runtime, queries)
}

#[tokio::test]
async fn test_server_rule_covers_tool_declaring_its_server() {
    let storage: SharedStorage = Arc::new(MemoryStorage::new());
    let store = Arc::new(ApprovalStore::new(storage));
    tokio_test::assert_ok!(
        store
            .add_rule(&drover_core::approval::RuleSpec::mcp_server("github"))
            .await
    );

    let client = Arc::new(ScriptedModelClient::new(vec![
        ScriptedTurn::new().with_tool_call("c1", "mcp_query", json!({ "query": "open issues" })),
        ScriptedTurn::text("done"),
    ]));
    let (runtime, queries) = mcp_runtime(&client, store, None);

    let executor = AgentExecutor::create(worker(&["mcp_query"]), runtime, ActivityStream::discard())
        .await
        .unwrap();
    let result = executor.run(AgentInputs::new(), CancellationToken::new()).await.unwrap();

    assert_eq!(output_of(&result.history[2].parts, "c1"), json!({ "output": "3 issues" }));
    assert_eq!(queries.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_remembering_server_tool_saves_server_rule() {
    let storage: SharedStorage = Arc::new(MemoryStorage::new());
    let store = Arc::new(ApprovalStore::new(storage));
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let handler = CallbackHandler::new(move |request: &drover_core::approval::ConfirmationRequest| {
        sink.lock().push(request.details.mcp_server.clone());
        ConfirmationOutcome::AllowAndRemember
    });

    let client = Arc::new(ScriptedModelClient::new(vec![
        ScriptedTurn::new().with_tool_call("c1", "mcp_query", json!({ "query": "open issues" })),
        ScriptedTurn::text("done"),
    ]));
    let (runtime, queries) = mcp_runtime(&client, store.clone(), Some(Arc::new(handler)));

    let executor = AgentExecutor::create(worker(&["mcp_query"]), runtime, ActivityStream::discard())
        .await
        .unwrap();
    executor.run(AgentInputs::new(), CancellationToken::new()).await.unwrap();

    assert_eq!(queries.load(Ordering::SeqCst), 1);
    assert_eq!(seen.lock().as_slice(), [Some("github".to_string())]);
    let rules = tokio_test::assert_ok!(store.list_rules().await);
    assert_eq!(rules.len(), 1);
    assert_eq!(rules[0].rule_type, drover_core::approval::ApprovalRuleType::McpServer);
    assert_eq!(rules[0].value, "github");
}

//! Tool-call dispatch for one turn

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use futures::StreamExt;
use futures::stream::FuturesUnordered;
use tokio_util::sync::CancellationToken;

use super::run::AgentExecutor;
use crate::activity::ActivityEvent;
use crate::approval::{ConfirmationRequest, GateDecision};
use crate::tools::{OutputCallback, ToolCallRequestInfo, ToolError, ToolErrorType, ToolResult};

/// Results of one turn's tool calls, in request order
pub(super) struct DispatchOutcome {
    pub results: Vec<ToolResult>,
    /// Set when a denial ended the turn and denials are fatal
    pub fatal_denial: Option<String>,
}

/// Outcome of a single call
struct CallOutcome {
    result: ToolResult,
    denied: bool,
}

impl CallOutcome {
    fn completed(result: ToolResult) -> Self {
        Self {
            result,
            denied: false,
        }
    }
}

impl AgentExecutor {
    /// Execute the calls of one turn, sequentially or concurrently
    pub(super) async fn dispatch_calls(
        &self,
        calls: &[ToolCallRequestInfo],
        cancel: &CancellationToken,
    ) -> DispatchOutcome {
        if self.parallel && calls.len() > 1 {
            self.dispatch_concurrent(calls, cancel).await
        } else {
            self.dispatch_sequential(calls, cancel).await
        }
    }

    async fn dispatch_sequential(
        &self,
        calls: &[ToolCallRequestInfo],
        cancel: &CancellationToken,
    ) -> DispatchOutcome {
        let mut results = Vec::with_capacity(calls.len());

        for call in calls {
            let outcome = self.execute_call(call, cancel).await;
            if outcome.denied && self.definition.run_config.deny_is_fatal {
                return DispatchOutcome {
                    results,
                    fatal_denial: Some(denial_message(&outcome.result)),
                };
            }
            results.push(outcome.result);
        }

        DispatchOutcome {
            results,
            fatal_denial: None,
        }
    }

    /// Dispatch every call at once and reassemble results in request order
    async fn dispatch_concurrent(
        &self,
        calls: &[ToolCallRequestInfo],
        cancel: &CancellationToken,
    ) -> DispatchOutcome {
        tracing::debug!(count = calls.len(), "Dispatching tool calls concurrently");

        let mut pending: FuturesUnordered<_> = calls
            .iter()
            .enumerate()
            .map(|(index, call)| async move { (index, self.execute_call(call, cancel).await) })
            .collect();

        let mut completed = Vec::with_capacity(calls.len());
        let mut fatal_denial = None;

        while let Some((index, outcome)) = pending.next().await {
            if outcome.denied && self.definition.run_config.deny_is_fatal && fatal_denial.is_none() {
                fatal_denial = Some(denial_message(&outcome.result));
                // Calls still waiting for the gate or not yet started must not run.
                cancel.cancel();
            }
            completed.push((index, outcome.result));
        }

        DispatchOutcome {
            results: reorder_results(calls, completed),
            fatal_denial,
        }
    }

    /// Gate, build and execute one call, emitting its activity events
    async fn execute_call(&self, call: &ToolCallRequestInfo, cancel: &CancellationToken) -> CallOutcome {
        let agent = self.definition.name.as_str();

        if !self.definition.tool_config.tools.iter().any(|t| t == &call.name) {
            return self.fail_before_start(
                call,
                ToolResult::error(
                    ToolErrorType::ToolNotFound,
                    format!("Tool '{}' is not available to agent '{}'", call.name, agent),
                ),
            );
        }
        let Some(tool) = self.runtime.tool_registry().get(&call.name) else {
            return self.fail_before_start(
                call,
                ToolResult::error(
                    ToolErrorType::ToolNotFound,
                    format!("Tool '{}' is not registered", call.name),
                ),
            );
        };

        let invocation = match tool.build(call.args.clone()) {
            Ok(invocation) => invocation,
            Err(e) => return self.fail_before_start(call, e.into()),
        };

        let description =
            invocation.get_description(self.runtime.tools_config().description_max_length);
        self.activity.emit(ActivityEvent::tool_start(
            agent,
            &call.call_id,
            &call.name,
            call.args.clone(),
            description,
        ));

        if let Some(mut details) = invocation.confirmation_details() {
            if let Some(server) = tool.mcp_server() {
                details = details.with_origin_server(server);
            }
            let request = ConfirmationRequest::new(
                &call.call_id,
                &call.name,
                tool.kind(),
                call.args.clone(),
                details,
            );
            let decision = tokio::select! {
                biased;
                _ = cancel.cancelled() => None,
                decision = self.runtime.gate().check(request) => Some(decision),
            };
            match decision {
                None => return self.finish_call(call, ToolError::Cancelled.into()),
                Some(GateDecision::Denied { reason }) => {
                    tracing::info!(tool = %call.name, call_id = %call.call_id, "Tool call denied");
                    let result = ToolResult::error(ToolErrorType::PermissionDenied, reason);
                    let mut outcome = self.finish_call(call, result);
                    outcome.denied = true;
                    return outcome;
                }
                Some(_) => {}
            }
        }

        if cancel.is_cancelled() {
            return self.finish_call(call, ToolError::Cancelled.into());
        }

        let progress: OutputCallback = {
            let activity = self.activity.clone();
            let source = call.name.clone();
            Arc::new(move |text: &str| activity.emit(ActivityEvent::thought(source.as_str(), text)))
        };

        tracing::debug!(tool = %call.name, call_id = %call.call_id, "Executing tool call");
        let execution = AssertUnwindSafe(invocation.execute(cancel.clone(), Some(progress))).catch_unwind();
        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => ToolError::Cancelled.into(),
            outcome = execution => match outcome {
                Ok(Ok(result)) => result,
                Ok(Err(e)) => {
                    tracing::warn!(tool = %call.name, error = %e, "Tool execution failed");
                    e.into()
                }
                Err(panic) => {
                    let message = panic_message(panic.as_ref());
                    tracing::error!(tool = %call.name, panic = %message, "Tool panicked");
                    ToolResult::error(
                        ToolErrorType::ExecutionFailed,
                        format!("Tool '{}' failed unexpectedly: {}", call.name, message),
                    )
                }
            },
        };

        self.finish_call(call, result)
    }

    /// Emit the end or error event for a started call
    fn finish_call(&self, call: &ToolCallRequestInfo, result: ToolResult) -> CallOutcome {
        let agent = self.definition.name.as_str();
        match &result.error {
            Some(error) => self.activity.emit(ActivityEvent::tool_error(
                agent,
                &call.call_id,
                &call.name,
                error.clone(),
            )),
            None => self.activity.emit(ActivityEvent::tool_end(
                agent,
                &call.call_id,
                &call.name,
                result.return_display.as_str(),
            )),
        }
        CallOutcome::completed(result)
    }

    /// Report a call that failed before an invocation existed
    fn fail_before_start(&self, call: &ToolCallRequestInfo, result: ToolResult) -> CallOutcome {
        tracing::warn!(tool = %call.name, call_id = %call.call_id, "Tool call rejected before execution");
        self.finish_call(call, result)
    }
}

/// Put results back into request order
fn reorder_results(calls: &[ToolCallRequestInfo], mut completed: Vec<(usize, ToolResult)>) -> Vec<ToolResult> {
    completed.sort_by_key(|(index, _)| *index);
    let mut completed = completed.into_iter().peekable();

    (0..calls.len())
        .map(|index| match completed.next_if(|(i, _)| *i == index) {
            Some((_, result)) => result,
            None => ToolResult::error(ToolErrorType::ExecutionFailed, "Result not found"),
        })
        .collect()
}

fn denial_message(result: &ToolResult) -> String {
    result
        .error
        .as_ref()
        .map(|e| e.message.clone())
        .unwrap_or_else(|| "Tool call denied".to_string())
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_reorder_results_restores_request_order() {
        let calls = vec![
            ToolCallRequestInfo::new("1", "a", json!({})),
            ToolCallRequestInfo::new("2", "b", json!({})),
            ToolCallRequestInfo::new("3", "c", json!({})),
        ];
        let completed = vec![
            (2, ToolResult::success("third")),
            (0, ToolResult::success("first")),
        ];

        let ordered = reorder_results(&calls, completed);
        assert_eq!(ordered[0].llm_content, "first");
        assert!(ordered[1].is_error());
        assert_eq!(ordered[2].llm_content, "third");
    }
}

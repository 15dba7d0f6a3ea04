//! Scripted model client
//!
//! Replays a fixed sequence of turns. Used to drive the engine
//! deterministically in tests and offline demos.

use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use parking_lot::Mutex;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use super::streaming::{ModelClient, ModelEvent, ModelRequest, ModelStream};
use crate::error::{DroverError, DroverResult};
use crate::tools::ToolCallRequestInfo;

/// One scripted model reply
#[derive(Debug, Clone, Default)]
pub struct ScriptedTurn {
    events: Vec<ModelEvent>,
    delay: Option<Duration>,
    fail_mid_stream: Option<String>,
    fail_on_start: Option<String>,
}

impl ScriptedTurn {
    /// Create an empty turn
    pub fn new() -> Self {
        Self::default()
    }

    /// Turn consisting of a single text reply
    pub fn text(text: impl Into<String>) -> Self {
        Self::new().with_text(text)
    }

    /// Append a text fragment
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.events.push(ModelEvent::Content(text.into()));
        self
    }

    /// Append a tool-call request
    pub fn with_tool_call(mut self, call_id: impl Into<String>, name: impl Into<String>, args: Value) -> Self {
        self.events
            .push(ModelEvent::ToolCallRequest(ToolCallRequestInfo::new(call_id, name, args)));
        self
    }

    /// Sleep this long before every event
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Yield a transport error after the scripted events
    pub fn failing_mid_stream(mut self, message: impl Into<String>) -> Self {
        self.fail_mid_stream = Some(message.into());
        self
    }

    /// Fail the request before any event is produced
    pub fn failing_on_start(mut self, message: impl Into<String>) -> Self {
        self.fail_on_start = Some(message.into());
        self
    }
}

/// Model client that replays [`ScriptedTurn`]s in order
#[derive(Debug, Default)]
pub struct ScriptedModelClient {
    turns: Mutex<VecDeque<ScriptedTurn>>,
    repeat: Option<ScriptedTurn>,
    requests: Mutex<Vec<ModelRequest>>,
}

impl ScriptedModelClient {
    /// Replay `turns` once each; further requests fail
    pub fn new(turns: impl IntoIterator<Item = ScriptedTurn>) -> Self {
        Self {
            turns: Mutex::new(turns.into_iter().collect()),
            repeat: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Answer every request with the same turn
    pub fn repeating(turn: ScriptedTurn) -> Self {
        Self {
            turns: Mutex::new(VecDeque::new()),
            repeat: Some(turn),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Requests received so far
    pub fn requests(&self) -> Vec<ModelRequest> {
        self.requests.lock().clone()
    }

    /// Number of requests received so far
    pub fn call_count(&self) -> usize {
        self.requests.lock().len()
    }
}

#[async_trait]
impl ModelClient for ScriptedModelClient {
    async fn send_message_stream(
        &self,
        request: ModelRequest,
        cancel: CancellationToken,
        request_id: &str,
    ) -> DroverResult<ModelStream> {
        self.requests.lock().push(request);

        let next = self.turns.lock().pop_front();
        let Some(turn) = next.or_else(|| self.repeat.clone()) else {
            return Err(DroverError::transport(format!(
                "Scripted model has no reply for request {}",
                request_id
            )));
        };

        if let Some(message) = turn.fail_on_start {
            return Err(DroverError::transport(message));
        }

        let delay = turn.delay;
        let events = futures::stream::iter(turn.events).then(move |event| async move {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            Ok::<_, DroverError>(event)
        });
        let failure = futures::stream::iter(
            turn.fail_mid_stream
                .map(|message| Err(DroverError::transport(message))),
        );

        Ok(Box::pin(
            events.chain(failure).take_until(cancel.cancelled_owned()),
        ))
    }
}

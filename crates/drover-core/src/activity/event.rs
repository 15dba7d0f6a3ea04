//! Activity event types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::tools::ToolErrorInfo;

/// Payload of an activity event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivityKind {
    /// A fragment of model output, delivered as it arrives
    ThoughtChunk { text: String },
    /// A tool call is about to pass through the gate
    #[serde(rename_all = "camelCase")]
    ToolCallStart {
        call_id: String,
        name: String,
        args: Value,
        description: String,
    },
    /// A tool call finished successfully
    #[serde(rename_all = "camelCase")]
    ToolCallEnd {
        call_id: String,
        name: String,
        output: String,
    },
    /// A tool call failed, or the run hit an error
    #[serde(rename_all = "camelCase")]
    Error {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        call_id: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        message: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<ToolErrorInfo>,
    },
}

/// One unit of the observable stream of a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEvent {
    /// Agent that produced the event
    pub agent_name: String,
    #[serde(flatten)]
    pub kind: ActivityKind,
    pub timestamp: DateTime<Utc>,
}

impl ActivityEvent {
    /// Create an event stamped with the current time
    pub fn new(agent_name: impl Into<String>, kind: ActivityKind) -> Self {
        Self {
            agent_name: agent_name.into(),
            kind,
            timestamp: Utc::now(),
        }
    }

    pub fn thought(agent_name: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(agent_name, ActivityKind::ThoughtChunk { text: text.into() })
    }

    pub fn tool_start(
        agent_name: impl Into<String>,
        call_id: impl Into<String>,
        name: impl Into<String>,
        args: Value,
        description: impl Into<String>,
    ) -> Self {
        Self::new(
            agent_name,
            ActivityKind::ToolCallStart {
                call_id: call_id.into(),
                name: name.into(),
                args,
                description: description.into(),
            },
        )
    }

    pub fn tool_end(
        agent_name: impl Into<String>,
        call_id: impl Into<String>,
        name: impl Into<String>,
        output: impl Into<String>,
    ) -> Self {
        Self::new(
            agent_name,
            ActivityKind::ToolCallEnd {
                call_id: call_id.into(),
                name: name.into(),
                output: output.into(),
            },
        )
    }

    /// Error tied to a tool call
    pub fn tool_error(
        agent_name: impl Into<String>,
        call_id: impl Into<String>,
        name: impl Into<String>,
        error: ToolErrorInfo,
    ) -> Self {
        Self::new(
            agent_name,
            ActivityKind::Error {
                call_id: Some(call_id.into()),
                name: Some(name.into()),
                message: error.message.clone(),
                error: Some(error),
            },
        )
    }

    /// Error not tied to any tool call
    pub fn run_error(agent_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(
            agent_name,
            ActivityKind::Error {
                call_id: None,
                name: None,
                message: message.into(),
                error: None,
            },
        )
    }

    /// Wire name of the event type
    pub fn type_name(&self) -> &'static str {
        match self.kind {
            ActivityKind::ThoughtChunk { .. } => "THOUGHT_CHUNK",
            ActivityKind::ToolCallStart { .. } => "TOOL_CALL_START",
            ActivityKind::ToolCallEnd { .. } => "TOOL_CALL_END",
            ActivityKind::Error { .. } => "ERROR",
        }
    }
}

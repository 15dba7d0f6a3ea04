//! Run result types

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::llm::Content;

/// Why a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TerminateReason {
    /// The agent finished its task
    Goal,
    /// The turn budget ran out
    MaxTurns,
    /// The wall-clock budget ran out
    MaxTime,
    /// The model stream failed
    Error,
    /// The run was cancelled or a fatal denial occurred
    Aborted,
}

impl TerminateReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            TerminateReason::Goal => "GOAL",
            TerminateReason::MaxTurns => "MAX_TURNS",
            TerminateReason::MaxTime => "MAX_TIME",
            TerminateReason::Error => "ERROR",
            TerminateReason::Aborted => "ABORTED",
        }
    }

    /// Only `GOAL` means the task is complete
    pub fn is_goal(&self) -> bool {
        matches!(self, TerminateReason::Goal)
    }
}

impl fmt::Display for TerminateReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of [`crate::agent::AgentExecutor::run`]
///
/// Every terminal state produces one. Anything but `GOAL` is an
/// incomplete-but-not-crashed outcome; `result` then holds the best partial
/// text or the triggering error message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    pub result: String,
    pub terminate_reason: TerminateReason,
    /// Model calls issued
    pub turns: u32,
    pub run_id: String,
    /// Conversation at the end of the run, for checkpointing
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub history: Vec<Content>,
}

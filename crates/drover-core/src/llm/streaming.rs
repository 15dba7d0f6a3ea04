//! Streaming model client trait

use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use futures::Stream;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use super::messages::Content;
use crate::agent::ModelConfig;
use crate::error::DroverResult;
use crate::tools::{ToolCallRequestInfo, ToolSchema};

/// One item of a streamed model reply
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum ModelEvent {
    /// Incremental text
    Content(String),
    /// A tool call the model wants made
    ToolCallRequest(ToolCallRequestInfo),
}

/// Stream of model events; an `Err` item is a transport failure
pub type ModelStream = Pin<Box<dyn Stream<Item = DroverResult<ModelEvent>> + Send>>;

/// Everything the model needs for one turn
#[derive(Debug, Clone, PartialEq)]
pub struct ModelRequest {
    pub model_config: ModelConfig,
    pub system_instruction: Option<String>,
    /// Full conversation so far; the last entry is this turn's input
    pub history: Vec<Content>,
    pub tools: Vec<ToolSchema>,
}

/// Streaming model service
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Start streaming a reply
    ///
    /// Implementations should end the stream promptly once `cancel` fires.
    /// `request_id` is unique per call and useful for tracing.
    async fn send_message_stream(
        &self,
        request: ModelRequest,
        cancel: CancellationToken,
        request_id: &str,
    ) -> DroverResult<ModelStream>;
}

/// Shared model client type
pub type SharedModelClient = Arc<dyn ModelClient>;

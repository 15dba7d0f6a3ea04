//! Core tool and invocation traits

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use super::error::ToolError;
use super::types::{ToolKind, ToolResult, ToolSchema};
use super::validation::validate_params;
use crate::approval::ConfirmationDetails;

/// Default bound on [`ToolInvocation::get_description`]
pub const DEFAULT_DESCRIPTION_MAX_LENGTH: usize = 200;

/// Receives incremental, human readable progress text
pub type OutputCallback = Arc<dyn Fn(&str) + Send + Sync>;

/// A capability the model can call
///
/// Tools are factories: [`Tool::build`] validates parameters and returns a
/// ready-to-run [`ToolInvocation`].
pub trait Tool: Send + Sync {
    /// Unique name used by the model (e.g. `read_file`)
    fn name(&self) -> &str;

    /// Name shown to users
    fn display_name(&self) -> &str {
        self.name()
    }

    /// Description for the model
    fn description(&self) -> &str;

    /// Declared kind, matched by `tool_kind` approval rules
    fn kind(&self) -> ToolKind;

    /// Parameter schema advertised to the model
    fn schema(&self) -> ToolSchema;

    /// MCP server this tool is proxied from, if any
    fn mcp_server(&self) -> Option<&str> {
        None
    }

    /// Validate parameters; the default checks them against [`Tool::schema`]
    fn validate(&self, params: &Value) -> Result<(), ToolError> {
        validate_params(&self.schema(), params)
    }

    /// Create an invocation for parameters that already passed validation
    fn create_invocation(&self, params: Value) -> Result<Box<dyn ToolInvocation>, ToolError>;

    /// Validate `params` and create an invocation
    fn build(&self, params: Value) -> Result<Box<dyn ToolInvocation>, ToolError> {
        self.validate(&params)?;
        self.create_invocation(params)
    }
}

/// A validated, ready-to-run tool call
#[async_trait]
pub trait ToolInvocation: Send + Sync {
    /// Untruncated summary of what this call will do
    fn description(&self) -> String;

    /// Summary bounded to `max_len` characters
    fn get_description(&self, max_len: usize) -> String {
        truncate_description(&self.description(), max_len)
    }

    /// Parameters this invocation was built from
    fn params(&self) -> &Value;

    /// Confirmation details, or `None` if the call can run unprompted
    fn confirmation_details(&self) -> Option<ConfirmationDetails> {
        None
    }

    /// Run the call
    ///
    /// Implementations should return promptly once `cancel` fires.
    /// `on_partial_output`, if given, receives progress text.
    async fn execute(
        &self,
        cancel: CancellationToken,
        on_partial_output: Option<OutputCallback>,
    ) -> Result<ToolResult, ToolError>;
}

/// Collapse whitespace and bound `text` to `max_len` characters
pub fn truncate_description(text: &str, max_len: usize) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= max_len {
        return collapsed;
    }
    if max_len <= 3 {
        return collapsed.chars().take(max_len).collect();
    }
    let mut truncated: String = collapsed.chars().take(max_len - 3).collect();
    truncated.push_str("...");
    truncated
}

//! Error type for tool operations

use super::types::{ToolErrorType, ToolResult};

/// Failure raised while building or executing a tool invocation
#[derive(Debug, Clone, thiserror::Error)]
pub enum ToolError {
    /// Parameters failed validation
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    /// The tool body failed
    #[error("Execution failed: {0}")]
    ExecutionFailed(String),

    /// The call was refused by the confirmation gate
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// No tool with this name is registered
    #[error("Tool not found: {0}")]
    NotFound(String),

    /// Execution was cancelled
    #[error("Tool execution cancelled")]
    Cancelled,
}

impl ToolError {
    /// The [`ToolErrorType`] reported to the model
    pub fn error_type(&self) -> ToolErrorType {
        match self {
            ToolError::InvalidParameters(_) => ToolErrorType::InvalidParameters,
            ToolError::ExecutionFailed(_) => ToolErrorType::ExecutionFailed,
            ToolError::PermissionDenied(_) => ToolErrorType::PermissionDenied,
            ToolError::NotFound(_) => ToolErrorType::ToolNotFound,
            ToolError::Cancelled => ToolErrorType::Cancelled,
        }
    }
}

impl crate::error::UnifiedError for ToolError {
    fn error_code(&self) -> &str {
        self.error_type().as_str()
    }

    fn message(&self) -> &str {
        match self {
            ToolError::InvalidParameters(msg) => msg,
            ToolError::ExecutionFailed(msg) => msg,
            ToolError::PermissionDenied(msg) => msg,
            ToolError::NotFound(name) => name,
            ToolError::Cancelled => "Tool execution cancelled",
        }
    }
}

impl From<serde_json::Error> for ToolError {
    fn from(error: serde_json::Error) -> Self {
        ToolError::InvalidParameters(error.to_string())
    }
}

impl From<ToolError> for ToolResult {
    fn from(error: ToolError) -> Self {
        let message = crate::error::UnifiedError::message(&error).to_string();
        ToolResult::error(error.error_type(), message)
    }
}

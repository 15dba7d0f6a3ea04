//! Tool-related type definitions

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Declared category of a tool, used by `tool_kind` approval rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolKind {
    Read,
    Edit,
    Delete,
    Move,
    Search,
    Execute,
    Think,
    Fetch,
    #[default]
    Other,
}

impl ToolKind {
    /// Stable string form
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolKind::Read => "read",
            ToolKind::Edit => "edit",
            ToolKind::Delete => "delete",
            ToolKind::Move => "move",
            ToolKind::Search => "search",
            ToolKind::Execute => "execute",
            ToolKind::Think => "think",
            ToolKind::Fetch => "fetch",
            ToolKind::Other => "other",
        }
    }

    /// Whether tools of this kind leave the workspace untouched
    pub fn is_read_only(&self) -> bool {
        matches!(
            self,
            ToolKind::Read | ToolKind::Search | ToolKind::Think | ToolKind::Fetch
        )
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToolKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "read" => Ok(ToolKind::Read),
            "edit" => Ok(ToolKind::Edit),
            "delete" => Ok(ToolKind::Delete),
            "move" => Ok(ToolKind::Move),
            "search" => Ok(ToolKind::Search),
            "execute" => Ok(ToolKind::Execute),
            "think" => Ok(ToolKind::Think),
            "fetch" => Ok(ToolKind::Fetch),
            "other" => Ok(ToolKind::Other),
            other => Err(format!("unknown tool kind '{}'", other)),
        }
    }
}

/// A tool call requested by the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCallRequestInfo {
    /// Name of the requested tool
    pub name: String,
    /// Arguments as sent by the model
    pub args: Value,
    /// Correlates the request with its result within one turn
    pub call_id: String,
}

impl ToolCallRequestInfo {
    /// Create a new tool call request
    pub fn new(call_id: impl Into<String>, name: impl Into<String>, args: Value) -> Self {
        Self {
            name: name.into(),
            args,
            call_id: call_id.into(),
        }
    }
}

/// Classification of a tool failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ToolErrorType {
    InvalidParameters,
    ExecutionFailed,
    PermissionDenied,
    Cancelled,
    ToolNotFound,
}

impl ToolErrorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolErrorType::InvalidParameters => "INVALID_PARAMETERS",
            ToolErrorType::ExecutionFailed => "EXECUTION_FAILED",
            ToolErrorType::PermissionDenied => "PERMISSION_DENIED",
            ToolErrorType::Cancelled => "CANCELLED",
            ToolErrorType::ToolNotFound => "TOOL_NOT_FOUND",
        }
    }
}

impl fmt::Display for ToolErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured error attached to a [`ToolResult`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolErrorInfo {
    pub message: String,
    #[serde(rename = "type")]
    pub error_type: ToolErrorType,
}

/// Result of a tool execution
///
/// `llm_content` is fed back to the model; `return_display` is for humans.
/// An `error` does not abort the run: it reaches the model as a tool
/// response so it can retry or adapt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolResult {
    pub llm_content: String,
    pub return_display: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ToolErrorInfo>,
}

impl ToolResult {
    /// Create a successful result shown identically to model and user
    pub fn success(content: impl Into<String>) -> Self {
        let content = content.into();
        Self {
            return_display: content.clone(),
            llm_content: content,
            error: None,
        }
    }

    /// Create a successful result with a separate display string
    pub fn with_display(llm_content: impl Into<String>, return_display: impl Into<String>) -> Self {
        Self {
            llm_content: llm_content.into(),
            return_display: return_display.into(),
            error: None,
        }
    }

    /// Create a failed result
    pub fn error(error_type: ToolErrorType, message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            llm_content: format!("Error: {}", message),
            return_display: format!("Error ({}): {}", error_type, message),
            error: Some(ToolErrorInfo {
                message,
                error_type,
            }),
        }
    }

    /// Check if this result carries an error
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// The error type, if any
    pub fn error_type(&self) -> Option<ToolErrorType> {
        self.error.as_ref().map(|e| e.error_type)
    }
}

/// Parameter definition for a tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolParameter {
    pub name: String,
    pub description: String,
    /// JSON type: string, number, integer, boolean, array or object
    pub param_type: String,
    pub required: bool,
}

impl ToolParameter {
    fn typed(name: impl Into<String>, description: impl Into<String>, param_type: &str) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            param_type: param_type.to_string(),
            required: true,
        }
    }

    /// Create a required string parameter
    pub fn string(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::typed(name, description, "string")
    }

    /// Create a required number parameter
    pub fn number(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::typed(name, description, "number")
    }

    /// Create a required integer parameter
    pub fn integer(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::typed(name, description, "integer")
    }

    /// Create a required boolean parameter
    pub fn boolean(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::typed(name, description, "boolean")
    }

    /// Create a parameter of an arbitrary JSON type
    pub fn of_type(
        name: impl Into<String>,
        description: impl Into<String>,
        param_type: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            param_type: param_type.into(),
            required: true,
        }
    }

    /// Make parameter optional
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }
}

/// Function declaration advertised to the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSchema {
    pub name: String,
    pub description: String,
    /// JSON schema object for the parameters
    pub parameters: Value,
}

impl ToolSchema {
    /// Build a schema from a parameter list
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: Vec<ToolParameter>,
    ) -> Self {
        let mut properties = serde_json::Map::new();
        let mut required = Vec::new();

        for param in parameters {
            if param.required {
                required.push(Value::String(param.name.clone()));
            }
            properties.insert(
                param.name,
                serde_json::json!({
                    "type": param.param_type,
                    "description": param.description,
                }),
            );
        }

        Self {
            name: name.into(),
            description: description.into(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": properties,
                "required": required,
            }),
        }
    }
}

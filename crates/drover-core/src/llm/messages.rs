//! Conversation history types

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::tools::{ToolCallRequestInfo, ToolResult};

/// Author of a history entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

/// One part of a history entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Part {
    Text(String),
    FunctionCall {
        id: String,
        name: String,
        args: Value,
    },
    FunctionResponse {
        id: String,
        name: String,
        response: Value,
    },
}

impl Part {
    /// Tool-response part carrying a result back to the model
    pub fn function_response(call: &ToolCallRequestInfo, result: &ToolResult) -> Self {
        let response = match &result.error {
            Some(error) => serde_json::json!({
                "error": error.message,
                "errorType": error.error_type,
            }),
            None => serde_json::json!({ "output": result.llm_content }),
        };
        Part::FunctionResponse {
            id: call.call_id.clone(),
            name: call.name.clone(),
            response,
        }
    }

    /// Tool-call part recording what the model asked for
    pub fn function_call(call: &ToolCallRequestInfo) -> Self {
        Part::FunctionCall {
            id: call.call_id.clone(),
            name: call.name.clone(),
            args: call.args.clone(),
        }
    }

    /// Text of a text part
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Part::Text(text) => Some(text),
            _ => None,
        }
    }
}

/// One history entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    pub role: Role,
    pub parts: Vec<Part>,
}

impl Content {
    /// User message made of a single text part
    pub fn user_text(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            parts: vec![Part::Text(text.into())],
        }
    }

    /// User message made of arbitrary parts
    pub fn user(parts: Vec<Part>) -> Self {
        Self {
            role: Role::User,
            parts,
        }
    }

    /// Model message made of arbitrary parts
    pub fn model(parts: Vec<Part>) -> Self {
        Self {
            role: Role::Model,
            parts,
        }
    }

    /// Concatenated text of every text part
    pub fn text(&self) -> String {
        self.parts.iter().filter_map(Part::as_text).collect()
    }
}

//! Confirmation request and outcome types

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::rule::{ApprovalRuleType, RuleSpec};
use crate::tools::ToolKind;

/// What an invocation tells the gate about itself when it wants confirmation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfirmationDetails {
    /// Short title for the prompt
    pub title: String,
    /// Human readable summary of the pending call
    pub prompt: String,
    /// Full command line, for shell-like tools
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    /// Originating MCP server, for tools proxied from one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mcp_server: Option<String>,
    /// Rule persisted when the user picks "allow and remember"
    pub suggested_rule: RuleSpec,
}

impl ConfirmationDetails {
    /// Details for a plain tool; remembering approves the tool by name
    pub fn for_tool(tool_name: &str, prompt: impl Into<String>) -> Self {
        Self {
            title: format!("Confirm {}", tool_name),
            prompt: prompt.into(),
            command: None,
            mcp_server: None,
            suggested_rule: RuleSpec::tool_name(tool_name),
        }
    }

    /// Details for a shell command; remembering approves its first word
    pub fn for_command(command: impl Into<String>) -> Self {
        let command = command.into();
        Self {
            title: "Confirm shell command".to_string(),
            prompt: command.clone(),
            suggested_rule: RuleSpec::command_prefix(&command),
            command: Some(command),
            mcp_server: None,
        }
    }

    /// Details for an MCP tool; remembering approves the whole server
    pub fn for_mcp(server: impl Into<String>, tool_name: &str, prompt: impl Into<String>) -> Self {
        let server = server.into();
        Self {
            title: format!("Confirm MCP tool {} ({})", tool_name, server),
            prompt: prompt.into(),
            command: None,
            suggested_rule: RuleSpec::mcp_server(server.clone()),
            mcp_server: Some(server),
        }
    }

    /// Record the MCP server a tool is proxied from, unless the details
    /// already name one. A suggested `tool_name` rule becomes an
    /// `mcp_server` rule for that server.
    pub fn with_origin_server(mut self, server: &str) -> Self {
        if self.mcp_server.is_some() {
            return self;
        }
        if self.suggested_rule.rule_type == ApprovalRuleType::ToolName {
            self.suggested_rule = RuleSpec::mcp_server(server);
        }
        self.mcp_server = Some(server.to_string());
        self
    }

    /// Replace the suggested rule
    pub fn with_suggested_rule(mut self, rule: RuleSpec) -> Self {
        self.suggested_rule = rule;
        self
    }
}

/// A single call awaiting a gate decision
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfirmationRequest {
    pub call_id: String,
    pub tool_name: String,
    pub tool_kind: ToolKind,
    pub args: Value,
    pub details: ConfirmationDetails,
}

impl ConfirmationRequest {
    /// Create a new confirmation request
    pub fn new(
        call_id: impl Into<String>,
        tool_name: impl Into<String>,
        tool_kind: ToolKind,
        args: Value,
        details: ConfirmationDetails,
    ) -> Self {
        Self {
            call_id: call_id.into(),
            tool_name: tool_name.into(),
            tool_kind,
            args,
            details,
        }
    }
}

/// Decision returned by a confirmation handler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfirmationOutcome {
    /// Refuse the call
    Deny,
    /// Run this call only
    AllowOnce,
    /// Run this call and persist the suggested rule
    AllowAndRemember,
}

impl ConfirmationOutcome {
    /// Check if this outcome lets the call run
    pub fn is_allowed(&self) -> bool {
        !matches!(self, ConfirmationOutcome::Deny)
    }
}

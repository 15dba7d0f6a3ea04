//! Approval rule types

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Class of tool calls a rule exempts from confirmation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalRuleType {
    /// Every tool of a declared kind (e.g. `read`)
    ToolKind,
    /// One tool by exact name
    ToolName,
    /// Every tool originating from one MCP server
    McpServer,
    /// Shell commands matching an exact string or a `prefix*` pattern
    CommandPattern,
}

impl ApprovalRuleType {
    /// Order in which the gate consults rule types
    pub const MATCH_ORDER: [ApprovalRuleType; 4] = [
        ApprovalRuleType::ToolName,
        ApprovalRuleType::ToolKind,
        ApprovalRuleType::CommandPattern,
        ApprovalRuleType::McpServer,
    ];

    /// Stable string form, as persisted
    pub fn as_str(&self) -> &'static str {
        match self {
            ApprovalRuleType::ToolKind => "tool_kind",
            ApprovalRuleType::ToolName => "tool_name",
            ApprovalRuleType::McpServer => "mcp_server",
            ApprovalRuleType::CommandPattern => "command_pattern",
        }
    }
}

impl fmt::Display for ApprovalRuleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApprovalRuleType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tool_kind" => Ok(ApprovalRuleType::ToolKind),
            "tool_name" => Ok(ApprovalRuleType::ToolName),
            "mcp_server" => Ok(ApprovalRuleType::McpServer),
            "command_pattern" => Ok(ApprovalRuleType::CommandPattern),
            other => Err(format!("unknown approval rule type '{}'", other)),
        }
    }
}

/// A `(type, value)` pair identifying a rule before it is persisted
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RuleSpec {
    #[serde(rename = "type")]
    pub rule_type: ApprovalRuleType,
    pub value: String,
}

impl RuleSpec {
    /// Create a new rule spec
    pub fn new(rule_type: ApprovalRuleType, value: impl Into<String>) -> Self {
        Self {
            rule_type,
            value: value.into(),
        }
    }

    pub fn tool_name(name: impl Into<String>) -> Self {
        Self::new(ApprovalRuleType::ToolName, name)
    }

    pub fn tool_kind(kind: impl Into<String>) -> Self {
        Self::new(ApprovalRuleType::ToolKind, kind)
    }

    pub fn mcp_server(server: impl Into<String>) -> Self {
        Self::new(ApprovalRuleType::McpServer, server)
    }

    pub fn command_pattern(pattern: impl Into<String>) -> Self {
        Self::new(ApprovalRuleType::CommandPattern, pattern)
    }

    /// Pattern covering every invocation of the command's first word,
    /// e.g. `npm test` becomes `npm *`
    pub fn command_prefix(command: &str) -> Self {
        match command.split_whitespace().next() {
            Some(program) => Self::command_pattern(format!("{} *", program)),
            None => Self::command_pattern(command.trim()),
        }
    }

    /// Human readable summary shown when listing rules
    pub fn describe(&self) -> String {
        match self.rule_type {
            ApprovalRuleType::ToolKind => format!("Always allow {} tools", self.value),
            ApprovalRuleType::ToolName => format!("Always allow tool '{}'", self.value),
            ApprovalRuleType::McpServer => {
                format!("Always allow tools from MCP server '{}'", self.value)
            }
            ApprovalRuleType::CommandPattern => {
                format!("Always allow shell commands matching '{}'", self.value)
            }
        }
    }
}

/// A persisted "always allow" rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalRule {
    pub id: String,
    #[serde(rename = "type")]
    pub rule_type: ApprovalRuleType,
    pub value: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_used: Option<DateTime<Utc>>,
}

impl ApprovalRule {
    /// Create a fresh rule with a new id and the current timestamp
    pub fn from_spec(spec: &RuleSpec) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            rule_type: spec.rule_type,
            value: spec.value.clone(),
            description: spec.describe(),
            created_at: Utc::now(),
            last_used: None,
        }
    }

    /// The `(type, value)` identity of this rule
    pub fn spec(&self) -> RuleSpec {
        RuleSpec::new(self.rule_type, self.value.clone())
    }

    /// Whether this rule has the given `(type, value)` identity
    pub fn same_identity(&self, spec: &RuleSpec) -> bool {
        self.rule_type == spec.rule_type && self.value == spec.value
    }
}

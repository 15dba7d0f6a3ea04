//! UnifiedError trait implementation for DroverError

use super::types::{DroverError, UnifiedError};

impl UnifiedError for DroverError {
    fn error_code(&self) -> &str {
        match self {
            Self::Config { .. } => "DROVER_CONFIG",
            Self::Validation { .. } => "DROVER_VALIDATION",
            Self::AgentInit { .. } => "DROVER_AGENT_INIT",
            Self::Transport { .. } => "DROVER_TRANSPORT",
            Self::Storage { .. } => "DROVER_STORAGE",
            Self::Io { .. } => "DROVER_IO",
            Self::Json { .. } => "DROVER_JSON",
            Self::Cancelled => "DROVER_CANCELLED",
            Self::Other { .. } => "DROVER_OTHER",
        }
    }

    fn message(&self) -> &str {
        match self {
            Self::Config { message, .. }
            | Self::Validation { message, .. }
            | Self::AgentInit { message, .. }
            | Self::Transport { message, .. }
            | Self::Storage { message, .. }
            | Self::Io { message, .. }
            | Self::Json { message, .. }
            | Self::Other { message, .. } => message,
            Self::Cancelled => "Operation was cancelled",
        }
    }

    fn context(&self) -> Option<&str> {
        match self {
            Self::Config { context, .. }
            | Self::Validation { context, .. }
            | Self::AgentInit { context, .. }
            | Self::Transport { context, .. }
            | Self::Storage { context, .. }
            | Self::Io { context, .. }
            | Self::Json { context, .. }
            | Self::Other { context, .. } => context.as_deref(),
            Self::Cancelled => None,
        }
    }

    // Retry policy for the model stream belongs to the model client; only
    // storage hiccups are worth retrying at this layer.
    fn is_retryable(&self) -> bool {
        matches!(self, Self::Io { .. } | Self::Storage { .. })
    }
}

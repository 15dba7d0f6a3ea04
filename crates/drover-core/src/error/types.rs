//! Core error types and traits for Drover

use thiserror::Error;

/// Result type alias for Drover operations
pub type DroverResult<T> = Result<T, DroverError>;

/// Unified error trait implemented by every error type in the crate.
///
/// - error_code(): stable code for programmatic handling
/// - message(): human-readable message
/// - context(): optional extra context
pub trait UnifiedError: std::error::Error + Send + Sync {
    /// Get the error code for programmatic handling
    fn error_code(&self) -> &str;

    /// Get the human-readable error message
    fn message(&self) -> &str;

    /// Get optional context about the error
    fn context(&self) -> Option<&str> {
        None
    }

    /// Check if this error is retryable
    fn is_retryable(&self) -> bool {
        false
    }
}

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error
    fn context<C: std::fmt::Display>(self, context: C) -> DroverResult<T>;

    /// Add context lazily (only evaluated on error)
    fn with_context<C: std::fmt::Display, F: FnOnce() -> C>(self, f: F) -> DroverResult<T>;
}

impl<T, E: std::fmt::Display> ResultExt<T> for Result<T, E> {
    fn context<C: std::fmt::Display>(self, context: C) -> DroverResult<T> {
        self.map_err(|e| DroverError::other(format!("{}: {}", context, e)))
    }

    fn with_context<C: std::fmt::Display, F: FnOnce() -> C>(self, f: F) -> DroverResult<T> {
        self.map_err(|e| DroverError::other(format!("{}: {}", f(), e)))
    }
}

/// Extension trait for adding context to Option types
pub trait OptionExt<T> {
    /// Convert Option to Result with context message
    fn context<C: std::fmt::Display>(self, context: C) -> DroverResult<T>;

    /// Convert Option to Result with lazy context message
    fn with_context<C: std::fmt::Display, F: FnOnce() -> C>(self, f: F) -> DroverResult<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn context<C: std::fmt::Display>(self, context: C) -> DroverResult<T> {
        self.ok_or_else(|| DroverError::other(context.to_string()))
    }

    fn with_context<C: std::fmt::Display, F: FnOnce() -> C>(self, f: F) -> DroverResult<T> {
        self.ok_or_else(|| DroverError::other(f().to_string()))
    }
}

/// Main error type for Drover
#[derive(Error, Debug, Clone)]
pub enum DroverError {
    /// Configuration related errors
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        context: Option<String>,
    },

    /// Bad agent definition or run inputs; raised before a run starts
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        field: Option<String>,
        context: Option<String>,
    },

    /// Executor could not be created (e.g. a required tool is not registered)
    #[error("Agent init error: {message}")]
    AgentInit {
        message: String,
        agent: Option<String>,
        context: Option<String>,
    },

    /// The model stream failed
    #[error("Transport error: {message}")]
    Transport {
        message: String,
        context: Option<String>,
    },

    /// Storage/persistence errors
    #[error("Storage error: {message}")]
    Storage {
        message: String,
        context: Option<String>,
    },

    /// IO errors
    #[error("IO error: {message}")]
    Io {
        message: String,
        path: Option<String>,
        context: Option<String>,
    },

    /// JSON serialization/deserialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        context: Option<String>,
    },

    /// Operation was cancelled
    #[error("Operation was cancelled")]
    Cancelled,

    /// Generic error with context
    #[error("Error: {message}")]
    Other {
        message: String,
        context: Option<String>,
    },
}

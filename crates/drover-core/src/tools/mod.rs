//! Tool contract and registry
//!
//! A [`Tool`] validates parameters and builds a [`ToolInvocation`]. Parameter
//! validation happens in [`Tool::build`], so an invocation that exists is
//! always well formed and no side effect can happen before validation.
//! Invocations report their outcome as a [`ToolResult`]; failures are data,
//! not executor errors.

mod error;
mod registry;
mod tool_trait;
mod types;
mod validation;


pub use error::ToolError;
pub use registry::{SharedToolRegistry, ToolRegistry};
pub use tool_trait::{
    DEFAULT_DESCRIPTION_MAX_LENGTH, OutputCallback, Tool, ToolInvocation, truncate_description,
};
pub use types::{
    ToolCallRequestInfo, ToolErrorInfo, ToolErrorType, ToolKind, ToolParameter, ToolResult,
    ToolSchema,
};
pub use validation::validate_params;
pub(crate) use validation::json_type_matches;

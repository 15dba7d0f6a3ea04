//! Error types for Drover
//!
//! All fallible engine operations return [`DroverResult`]. Every variant of
//! [`DroverError`] carries a human-readable message and an optional context
//! string, and implements [`UnifiedError`] so callers can branch on a stable
//! error code instead of matching on message text.
//!
//! Tool-level failures are *not* represented here: they are recovered locally
//! and surfaced to the model as `ToolResult.error` (see [`crate::tools`]).

mod constructors;
mod conversions;
mod types;
mod unified_error;


pub use types::{DroverError, DroverResult, OptionExt, ResultExt, UnifiedError};

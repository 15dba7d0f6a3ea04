//! Conversation checkpoints
//!
//! Persists executor history under a tag so a session can be resumed with
//! [`crate::agent::AgentExecutor::with_history`], and trims long histories
//! on request. The executor itself never touches checkpoint storage.

mod manager;
mod trim;


pub use manager::{Checkpoint, CheckpointManager};
pub use trim::{TRIMMED_OUTPUT_PREFIX, trim_history};

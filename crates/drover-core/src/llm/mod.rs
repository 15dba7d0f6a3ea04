//! Model streaming interface
//!
//! The model API itself is an external collaborator. The engine only needs a
//! [`ModelClient`] that turns a [`ModelRequest`] into a stream of
//! [`ModelEvent`]s: text fragments and tool-call requests.

mod messages;
mod scripted;
mod streaming;

pub use messages::{Content, Part, Role};
pub use scripted::{ScriptedModelClient, ScriptedTurn};
pub use streaming::{ModelClient, ModelEvent, ModelRequest, ModelStream, SharedModelClient};

//! Agent executor

mod context;
mod dispatch;
mod run;


pub use context::{RuntimeContext, RuntimeContextBuilder};
pub use run::AgentExecutor;

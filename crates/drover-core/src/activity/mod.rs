//! Activity stream
//!
//! The executor reports everything observable about a run as an ordered
//! sequence of [`ActivityEvent`]s. Emission never blocks the producer: the
//! channel form is unbounded and the callback form runs inline.

mod event;
mod stream;


pub use event::{ActivityEvent, ActivityKind};
pub use stream::{ActivityCallback, ActivityReceiver, ActivityStream};

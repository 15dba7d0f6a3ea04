//! Producer and consumer halves of the activity stream

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;

use super::event::ActivityEvent;

/// Plain `(event) -> ()` observer
pub type ActivityCallback = Arc<dyn Fn(ActivityEvent) + Send + Sync>;

#[derive(Clone)]
enum Target {
    Channel(mpsc::UnboundedSender<ActivityEvent>),
    Callback(ActivityCallback),
    Discard,
}

/// Producer handle used by executors to emit activity
///
/// Cloning shares the same destination. Emitting never blocks and never
/// fails: events sent after the receiver is dropped are discarded.
#[derive(Clone)]
pub struct ActivityStream {
    target: Target,
}

impl std::fmt::Debug for ActivityStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self.target {
            Target::Channel(_) => "channel",
            Target::Callback(_) => "callback",
            Target::Discard => "discard",
        };
        f.debug_struct("ActivityStream").field("target", &kind).finish()
    }
}

impl ActivityStream {
    /// Create an unbounded channel and return both halves
    pub fn channel() -> (Self, ActivityReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                target: Target::Channel(tx),
            },
            ActivityReceiver { rx },
        )
    }

    /// Deliver events to a callback, inline on the producer's task
    pub fn from_callback<F>(callback: F) -> Self
    where
        F: Fn(ActivityEvent) + Send + Sync + 'static,
    {
        Self {
            target: Target::Callback(Arc::new(callback)),
        }
    }

    /// A stream nobody listens to
    pub fn discard() -> Self {
        Self {
            target: Target::Discard,
        }
    }

    /// Emit an event
    pub fn emit(&self, event: ActivityEvent) {
        match &self.target {
            Target::Channel(tx) => {
                if tx.send(event).is_err() {
                    tracing::trace!("Activity receiver dropped, discarding event");
                }
            }
            Target::Callback(callback) => callback(event),
            Target::Discard => {}
        }
    }
}

impl Default for ActivityStream {
    fn default() -> Self {
        Self::discard()
    }
}

/// Consumer half returned by [`ActivityStream::channel`]
#[derive(Debug)]
pub struct ActivityReceiver {
    rx: mpsc::UnboundedReceiver<ActivityEvent>,
}

impl ActivityReceiver {
    /// Wait for the next event; `None` once every producer is gone
    pub async fn recv(&mut self) -> Option<ActivityEvent> {
        self.rx.recv().await
    }

    /// Take an event if one is ready
    pub fn try_recv(&mut self) -> Option<ActivityEvent> {
        self.rx.try_recv().ok()
    }

    /// Drain every event that is ready now
    pub fn drain(&mut self) -> Vec<ActivityEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.rx.try_recv() {
            events.push(event);
        }
        events
    }

    /// Adapt into a `Stream`
    pub fn into_stream(self) -> UnboundedReceiverStream<ActivityEvent> {
        UnboundedReceiverStream::new(self.rx)
    }
}

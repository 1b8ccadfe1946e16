use serde::Serialize;
use tokio::sync::broadcast;

use teamchat_shared::{ContactRef, MessageId, UserId};

pub const EVENT_CAPACITY: usize = 256;

/// Which part of the state a mutation touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Change {
    Users,
    Groups,
    Messages,
    Presence,
    Settings,
    Session,
    Reset,
}

/// Notifications published to the presentation layer.  Any mutation is
/// followed by a `StateChanged` so subscribers can simply re-render.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum ChatEvent {
    StateChanged {
        change: Change,
    },
    LoggedIn {
        user: UserId,
    },
    LoggedOut {
        user: UserId,
    },
    ConversationOpened {
        contact: ContactRef,
    },
    /// A message arrived from someone else (simulated delivery).
    IncomingMessage {
        message: MessageId,
        from: UserId,
        preview: String,
    },
    /// A rendered message mentions the viewing user.
    Mentioned {
        message: MessageId,
        by: UserId,
        content: String,
    },
}

/// Fan-out channel for [`ChatEvent`]s.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<ChatEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChatEvent> {
        self.tx.subscribe()
    }

    pub fn emit(&self, event: ChatEvent) {
        // Err only means nobody is listening right now.
        if self.tx.send(event).is_err() {
            tracing::trace!("event dropped, no subscribers");
        }
    }

    pub fn changed(&self, change: Change) {
        self.emit(ChatEvent::StateChanged { change });
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(EVENT_CAPACITY)
    }
}

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::types::{Role, StreamState};

/// Notifications published on every observable state change.
///
/// Front-ends subscribe and re-render from the session snapshot; the
/// payloads only carry what is needed to render incrementally.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum Event {
    MessageAppended { index: usize, role: Role },
    AssistantDelta { index: usize, delta: String },
    MessagesReplaced { count: usize },
    MessagesCleared,
    StreamStateChanged(StreamState),
    ConversationChanged(Option<String>),
    ConversationListInvalidated,
    ConversationInvalidated(String),
    DocumentsInvalidated,
    SelectionChanged { count: usize },
    #[serde(other)]
    Unknown,
}

pub struct EventBus {
    sender: broadcast::Sender<Event>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.sender.subscribe()
    }

    pub fn publish(&self, event: Event) -> usize {
        self.sender.send(event).unwrap_or(0)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

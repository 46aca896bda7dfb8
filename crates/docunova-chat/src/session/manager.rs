//! SessionController struct, state snapshot accessors, and session switching.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use docunova_common::{Event, EventBus, Message, StreamState};
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::cache::CacheSynchronizer;
use crate::history::HistoryLoader;
use crate::selection::SelectionStore;
use crate::Backend;

use super::types::SessionSettings;

/// Owner of one conversation's in-memory message log and its answer stream.
///
/// Cheap to clone; clones drive the same session. All state changes are
/// published on the event bus so front-ends can render from snapshots.
#[derive(Clone)]
pub struct SessionController {
    pub(super) inner: Arc<Inner>,
}

pub(super) struct Inner {
    pub(super) backend: Arc<dyn Backend>,
    pub(super) cache: Arc<dyn CacheSynchronizer>,
    pub(super) selection: SelectionStore,
    pub(super) history: HistoryLoader,
    pub(super) settings: SessionSettings,
    pub(super) events: Arc<EventBus>,
    state: Mutex<SessionState>,
}

#[derive(Default)]
pub(super) struct SessionState {
    pub(super) active_conversation_id: Option<String>,
    pub(super) messages: Vec<Message>,
    pub(super) stream_state: StreamState,
    /// Bumped on every load/reset; async work from an older epoch is discarded.
    pub(super) epoch: u64,
    pub(super) cancel: Option<CancellationToken>,
}

impl SessionController {
    pub fn new(
        backend: Arc<dyn Backend>,
        cache: Arc<dyn CacheSynchronizer>,
        selection: SelectionStore,
        events: Arc<EventBus>,
        settings: SessionSettings,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                history: HistoryLoader::new(backend.clone()),
                backend,
                cache,
                selection,
                settings,
                events,
                state: Mutex::new(SessionState::default()),
            }),
        }
    }

    /// Snapshot of the message log.
    pub fn messages(&self) -> Vec<Message> {
        self.state().messages.clone()
    }

    pub fn message_count(&self) -> usize {
        self.state().messages.len()
    }

    pub fn active_conversation_id(&self) -> Option<String> {
        self.state().active_conversation_id.clone()
    }

    pub fn stream_state(&self) -> StreamState {
        self.state().stream_state
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.inner.events.subscribe()
    }

    pub fn selection(&self) -> &SelectionStore {
        &self.inner.selection
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.inner.settings
    }

    /// Start a fresh, not yet created conversation. No network call.
    pub fn reset_to_new_session(&self) {
        self.switch_to(None);
    }

    pub(super) fn state(&self) -> MutexGuard<'_, SessionState> {
        self.inner.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(super) fn publish(&self, event: Event) {
        self.inner.events.publish(event);
    }

    pub(super) fn set_stream_state(&self, state: &mut SessionState, next: StreamState) {
        if state.stream_state != next {
            state.stream_state = next;
            self.publish(Event::StreamStateChanged(next));
        }
    }

    /// Cancel any open stream and make `id` the active conversation with an
    /// empty log. Returns the new epoch.
    pub(super) fn switch_to(&self, id: Option<String>) -> u64 {
        let mut state = self.state();
        if let Some(cancel) = state.cancel.take() {
            cancel.cancel();
        }
        state.epoch += 1;
        state.active_conversation_id = id.clone();
        state.messages.clear();

        debug!(epoch = state.epoch, conversation_id = ?id, "session switched");
        self.publish(Event::ConversationChanged(id));
        self.publish(Event::MessagesCleared);
        self.set_stream_state(&mut state, StreamState::Idle);
        state.epoch
    }

    /// Append `message` unless the session moved on. Returns its index.
    pub(super) fn append_if_current(&self, epoch: u64, message: Message) -> Option<usize> {
        let mut state = self.state();
        if state.epoch != epoch {
            return None;
        }
        let role = message.role;
        state.messages.push(message);
        let index = state.messages.len() - 1;
        self.publish(Event::MessageAppended { index, role });
        Some(index)
    }

    /// Replace the content of the open assistant message with the answer so far.
    pub(super) fn apply_delta(&self, epoch: u64, index: usize, answer: &str, delta: String) -> bool {
        let mut state = self.state();
        if state.epoch != epoch {
            return false;
        }
        match state.messages.get_mut(index) {
            Some(message) => {
                message.content = answer.to_string();
                self.publish(Event::AssistantDelta { index, delta });
                true
            }
            None => false,
        }
    }

    /// Adopt the server's copy of the log after a completed answer, when it
    /// is at least as complete as ours (it carries the citations).
    pub(super) fn adopt_durable_log(&self, epoch: u64, conversation_id: &str, messages: Vec<Message>) {
        let mut state = self.state();
        if state.epoch != epoch
            || state.active_conversation_id.as_deref() != Some(conversation_id)
            || messages.len() < state.messages.len()
        {
            return;
        }
        let count = messages.len();
        state.messages = messages;
        self.publish(Event::MessagesReplaced { count });
    }

    pub(super) fn finish_stream(&self, epoch: u64) {
        let mut state = self.state();
        if state.epoch != epoch {
            return;
        }
        state.cancel = None;
        self.set_stream_state(&mut state, StreamState::Idle);
    }
}

impl std::fmt::Debug for SessionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state();
        f.debug_struct("SessionController")
            .field("active_conversation_id", &state.active_conversation_id)
            .field("messages", &state.messages.len())
            .field("stream_state", &state.stream_state)
            .field("epoch", &state.epoch)
            .finish()
    }
}

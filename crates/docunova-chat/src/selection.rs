//! Persisted set of context documents the backend may retrieve from.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, PoisonError};

use docunova_common::{Document, Event, EventBus, PlatformError};
use docunova_platform::KeyValueStore;
use tracing::{debug, warn};

/// Key under which the selection is persisted, as a JSON array.
pub const SELECTION_KEY: &str = "selectedDocumentIds";

/// Context-document selection.
///
/// Cheap to clone; clones share the same set. Every mutation and its
/// write to the key-value store happen under one lock, and the in-memory
/// set only changes once the write succeeded.
#[derive(Clone)]
pub struct SelectionStore {
    ids: Arc<Mutex<BTreeSet<String>>>,
    store: Arc<dyn KeyValueStore>,
    events: Option<Arc<EventBus>>,
}

impl SelectionStore {
    /// Load the selection: the persisted value wins, then `initial`, then empty.
    pub fn new(store: Arc<dyn KeyValueStore>, initial: Option<Vec<String>>) -> Self {
        let ids = match Self::load_persisted(store.as_ref()) {
            Some(ids) => ids,
            None => initial.unwrap_or_default().into_iter().collect(),
        };
        debug!(count = ids.len(), "loaded document selection");
        Self {
            ids: Arc::new(Mutex::new(ids)),
            store,
            events: None,
        }
    }

    pub fn with_events(mut self, events: Arc<EventBus>) -> Self {
        self.events = Some(events);
        self
    }

    fn load_persisted(store: &dyn KeyValueStore) -> Option<BTreeSet<String>> {
        let raw = store.get(SELECTION_KEY)?;
        match serde_json::from_str::<Vec<String>>(&raw) {
            Ok(ids) => Some(ids.into_iter().collect()),
            Err(e) => {
                warn!("ignoring unreadable {SELECTION_KEY}: {e}");
                None
            }
        }
    }

    /// Add `id` if absent, remove it if present. Returns whether it is now selected.
    pub fn toggle(&self, id: &str) -> Result<bool, PlatformError> {
        self.mutate(|ids| {
            if !ids.remove(id) {
                ids.insert(id.to_string());
            }
            ids.contains(id)
        })
    }

    /// Select exactly the completed documents in `docs`. Returns the new count.
    pub fn select_all(&self, docs: &[Document]) -> Result<usize, PlatformError> {
        self.mutate(|ids| {
            *ids = docs
                .iter()
                .filter(|d| d.status.is_completed())
                .map(|d| d.id.clone())
                .collect();
            ids.len()
        })
    }

    pub fn clear(&self) -> Result<(), PlatformError> {
        self.mutate(|ids| ids.clear())
    }

    /// Drop `id` from the selection if present. Returns whether it was selected.
    pub fn remove(&self, id: &str) -> Result<bool, PlatformError> {
        self.mutate(|ids| ids.remove(id))
    }

    /// Selected ids in sorted order.
    pub fn ids(&self) -> Vec<String> {
        self.lock().iter().cloned().collect()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.lock().contains(id)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeSet<String>> {
        self.ids.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn mutate<R>(&self, f: impl FnOnce(&mut BTreeSet<String>) -> R) -> Result<R, PlatformError> {
        let mut guard = self.lock();
        let mut next = guard.clone();
        let result = f(&mut next);

        let json = serde_json::to_string(&next)
            .map_err(|e| PlatformError::StorageError(e.to_string()))?;
        self.store.set(SELECTION_KEY, &json)?;

        *guard = next;
        if let Some(events) = &self.events {
            events.publish(Event::SelectionChanged { count: guard.len() });
        }
        Ok(result)
    }
}

impl std::fmt::Debug for SelectionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectionStore")
            .field("ids", &self.ids())
            .finish()
    }
}

//! Client-side caches of backend list and detail views.
//!
//! The session controller never touches cached data directly; it only
//! signals what changed through [`CacheSynchronizer`], and readers see
//! the effect on their next read.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use docunova_common::{
    Conversation, ConversationDetail, Document, Event, EventBus, ShareLink, UploadReceipt,
};
use tracing::{debug, info, warn};

use crate::selection::SelectionStore;
use crate::{ApiError, Backend, ExportFormat};

/// Named invalidations driven by session mutations.
#[async_trait]
pub trait CacheSynchronizer: Send + Sync {
    /// A conversation was created or removed.
    fn invalidate_conversation_list(&self);

    /// Refetch one conversation's detail after its log changed on the server.
    async fn refresh_conversation(&self, id: &str) -> Option<ConversationDetail>;

    fn invalidate_conversation(&self, id: &str);

    fn invalidate_documents(&self);
}

#[derive(Default)]
struct Entries {
    conversation_lists: HashMap<String, Vec<Conversation>>,
    details: HashMap<String, ConversationDetail>,
    documents: Option<Vec<Document>>,
    // Bumped by every invalidation; a fetch that started under an older
    // generation must not populate the cache.
    generation: u64,
}

/// Read-through cache over a [`Backend`].
pub struct QueryCache {
    backend: Arc<dyn Backend>,
    entries: Mutex<Entries>,
    events: Option<Arc<EventBus>>,
    selection: Option<SelectionStore>,
}

impl QueryCache {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self {
            backend,
            entries: Mutex::new(Entries::default()),
            events: None,
            selection: None,
        }
    }

    pub fn with_events(mut self, events: Arc<EventBus>) -> Self {
        self.events = Some(events);
        self
    }

    /// Keep `selection` in step with document deletions.
    pub fn with_selection(mut self, selection: SelectionStore) -> Self {
        self.selection = Some(selection);
        self
    }

    fn entries(&self) -> MutexGuard<'_, Entries> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn generation(&self) -> u64 {
        self.entries().generation
    }

    fn publish(&self, event: Event) {
        if let Some(events) = &self.events {
            events.publish(event);
        }
    }

    /// Conversation list, optionally filtered by `search` (cached per search string).
    pub async fn conversations(&self, search: &str) -> Result<Vec<Conversation>, ApiError> {
        let key = search.trim().to_string();
        let generation = {
            let entries = self.entries();
            if let Some(list) = entries.conversation_lists.get(&key) {
                return Ok(list.clone());
            }
            entries.generation
        };

        let list = self.backend.list_conversations(&key).await?;
        let mut entries = self.entries();
        if entries.generation == generation {
            entries.conversation_lists.insert(key, list.clone());
        }
        Ok(list)
    }

    pub async fn conversation(&self, id: &str) -> Result<ConversationDetail, ApiError> {
        let generation = {
            let entries = self.entries();
            if let Some(detail) = entries.details.get(id) {
                return Ok(detail.clone());
            }
            entries.generation
        };

        let detail = self.backend.conversation(id).await?;
        let mut entries = self.entries();
        if entries.generation == generation {
            entries.details.insert(id.to_string(), detail.clone());
        }
        Ok(detail)
    }

    pub async fn documents(&self) -> Result<Vec<Document>, ApiError> {
        let generation = {
            let entries = self.entries();
            if let Some(docs) = &entries.documents {
                return Ok(docs.clone());
            }
            entries.generation
        };

        let docs = self.backend.list_documents().await?;
        let mut entries = self.entries();
        if entries.generation == generation {
            entries.documents = Some(docs.clone());
        }
        Ok(docs)
    }

    pub async fn delete_conversation(&self, id: &str) -> Result<(), ApiError> {
        self.backend.delete_conversation(id).await?;
        info!(conversation_id = id, "conversation deleted");
        self.invalidate_conversation(id);
        self.invalidate_conversation_list();
        Ok(())
    }

    pub async fn export_conversation(
        &self,
        id: &str,
        format: ExportFormat,
    ) -> Result<String, ApiError> {
        self.backend.export_conversation(id, format).await
    }

    pub async fn share_conversation(&self, id: &str) -> Result<ShareLink, ApiError> {
        self.backend.share_conversation(id).await
    }

    pub async fn shared_conversation(&self, token: &str) -> Result<ConversationDetail, ApiError> {
        self.backend.shared_conversation(token).await
    }

    pub async fn upload_document(&self, path: &Path) -> Result<UploadReceipt, ApiError> {
        let receipt = self.backend.upload_document(path).await?;
        info!(document_id = %receipt.id, filename = %receipt.filename, "document uploaded");
        self.invalidate_documents();
        Ok(receipt)
    }

    /// Delete a document and drop it from the context selection.
    pub async fn delete_document(&self, id: &str) -> Result<(), ApiError> {
        self.backend.delete_document(id).await?;
        info!(document_id = id, "document deleted");
        self.invalidate_documents();
        if let Some(selection) = &self.selection {
            if let Err(e) = selection.remove(id) {
                warn!("failed to drop deleted document from selection: {e}");
            }
        }
        Ok(())
    }
}

#[async_trait]
impl CacheSynchronizer for QueryCache {
    fn invalidate_conversation_list(&self) {
        {
            let mut entries = self.entries();
            entries.generation += 1;
            entries.conversation_lists.clear();
        }
        debug!("conversation list invalidated");
        self.publish(Event::ConversationListInvalidated);
    }

    async fn refresh_conversation(&self, id: &str) -> Option<ConversationDetail> {
        self.invalidate_conversation(id);
        let generation = self.generation();

        match self.backend.conversation(id).await {
            Ok(detail) => {
                let mut entries = self.entries();
                if entries.generation == generation {
                    entries.details.insert(id.to_string(), detail.clone());
                }
                Some(detail)
            }
            Err(e) => {
                warn!(conversation_id = id, "failed to refresh conversation: {e}");
                None
            }
        }
    }

    fn invalidate_conversation(&self, id: &str) {
        {
            let mut entries = self.entries();
            entries.generation += 1;
            entries.details.remove(id);
        }
        self.publish(Event::ConversationInvalidated(id.to_string()));
    }

    fn invalidate_documents(&self) {
        {
            let mut entries = self.entries();
            entries.generation += 1;
            entries.documents = None;
        }
        self.publish(Event::DocumentsInvalidated);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeBackend;
    use docunova_common::{DocumentStatus, Message};
    use docunova_platform::MemoryStore;

    fn setup() -> (Arc<FakeBackend>, QueryCache) {
        let backend = Arc::new(FakeBackend::new());
        let cache = QueryCache::new(backend.clone());
        (backend, cache)
    }

    #[tokio::test]
    async fn list_is_cached_until_invalidated() {
        let (backend, cache) = setup();
        backend.insert_conversation("c1", vec![]);

        assert_eq!(cache.conversations("").await.unwrap().len(), 1);
        backend.insert_conversation("c2", vec![]);
        assert_eq!(cache.conversations("").await.unwrap().len(), 1);
        assert_eq!(backend.list_calls(), 1);

        cache.invalidate_conversation_list();
        assert_eq!(cache.conversations("").await.unwrap().len(), 2);
        assert_eq!(backend.list_calls(), 2);
    }

    #[tokio::test]
    async fn created_conversation_visible_after_invalidation() {
        let (backend, cache) = setup();
        assert!(cache.conversations("").await.unwrap().is_empty());

        let created = backend.create_conversation(Some("New chat...")).await.unwrap();
        cache.invalidate_conversation_list();

        let list = cache.conversations("").await.unwrap();
        assert!(list.iter().any(|c| c.id == created.id));
    }

    #[tokio::test]
    async fn search_strings_are_cached_separately() {
        let (backend, cache) = setup();
        backend.insert_conversation("c1", vec![]);

        cache.conversations("").await.unwrap();
        cache.conversations("refund").await.unwrap();
        cache.conversations("refund").await.unwrap();
        assert_eq!(backend.list_calls(), 2);
    }

    #[tokio::test]
    async fn refresh_replaces_cached_detail() {
        let (backend, cache) = setup();
        backend.insert_conversation("c1", vec![Message::user("q")]);
        assert_eq!(cache.conversation("c1").await.unwrap().messages.len(), 1);

        backend.insert_conversation("c1", vec![Message::user("q"), Message::assistant("a")]);
        assert_eq!(cache.conversation("c1").await.unwrap().messages.len(), 1);

        let refreshed = cache.refresh_conversation("c1").await.unwrap();
        assert_eq!(refreshed.messages.len(), 2);
        assert_eq!(cache.conversation("c1").await.unwrap().messages.len(), 2);
    }

    #[tokio::test]
    async fn refresh_of_missing_conversation_is_none() {
        let (_, cache) = setup();
        assert!(cache.refresh_conversation("nope").await.is_none());
    }

    #[tokio::test]
    async fn delete_conversation_drops_list_and_detail() {
        let (backend, cache) = setup();
        backend.insert_conversation("c1", vec![]);
        cache.conversations("").await.unwrap();
        cache.conversation("c1").await.unwrap();

        cache.delete_conversation("c1").await.unwrap();
        assert!(cache.conversations("").await.unwrap().is_empty());
        assert!(matches!(
            cache.conversation("c1").await,
            Err(ApiError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn delete_document_updates_cache_and_selection() {
        let backend = Arc::new(FakeBackend::new());
        backend.insert_document("d1", DocumentStatus::Completed);
        backend.insert_document("d2", DocumentStatus::Completed);

        let selection = SelectionStore::new(Arc::new(MemoryStore::new()), None);
        selection.toggle("d1").unwrap();
        selection.toggle("d2").unwrap();

        let cache = QueryCache::new(backend.clone()).with_selection(selection.clone());
        assert_eq!(cache.documents().await.unwrap().len(), 2);

        cache.delete_document("d1").await.unwrap();
        assert_eq!(cache.documents().await.unwrap().len(), 1);
        assert_eq!(selection.ids(), vec!["d2".to_string()]);
    }

    #[tokio::test]
    async fn upload_invalidates_documents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "hello").unwrap();

        let (backend, cache) = setup();
        assert!(cache.documents().await.unwrap().is_empty());

        let receipt = cache.upload_document(&path).await.unwrap();
        assert_eq!(receipt.filename, "notes.txt");

        let docs = cache.documents().await.unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(backend.documents_calls(), 2);
    }

    #[tokio::test]
    async fn invalidations_publish_events() {
        let bus = Arc::new(EventBus::new(16));
        let mut rx = bus.subscribe();
        let (_, cache) = setup();
        let cache = cache.with_events(bus);

        cache.invalidate_conversation_list();
        cache.invalidate_documents();
        assert!(matches!(
            rx.recv().await.unwrap(),
            Event::ConversationListInvalidated
        ));
        assert!(matches!(rx.recv().await.unwrap(), Event::DocumentsInvalidated));
    }
}

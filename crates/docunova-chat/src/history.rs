//! Durable message log of existing conversations.

use std::sync::Arc;

use docunova_common::Message;
use tracing::debug;

use crate::{ApiError, Backend};

/// Read-only access to a conversation's stored messages.
#[derive(Clone)]
pub struct HistoryLoader {
    backend: Arc<dyn Backend>,
}

impl HistoryLoader {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }

    pub async fn load(&self, conversation_id: &str) -> Result<Vec<Message>, ApiError> {
        let detail = self.backend.conversation(conversation_id).await?;
        debug!(
            conversation_id,
            messages = detail.messages.len(),
            "loaded conversation history"
        );
        Ok(detail.messages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeBackend;
    use docunova_common::Role;

    #[tokio::test]
    async fn load_returns_stored_messages() {
        let backend = Arc::new(FakeBackend::new());
        backend.insert_conversation(
            "c1",
            vec![Message::user("hi"), Message::assistant("hello")],
        );
        let loader = HistoryLoader::new(backend);

        let messages = loader.load("c1").await.unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::User);
        assert_eq!(messages[1].content, "hello");
    }

    #[tokio::test]
    async fn unknown_conversation_is_not_found() {
        let loader = HistoryLoader::new(Arc::new(FakeBackend::new()));
        let err = loader.load("missing").await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }
}

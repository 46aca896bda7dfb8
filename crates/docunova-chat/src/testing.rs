//! In-memory backend for unit tests.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use docunova_common::{
    Conversation, ConversationDetail, Document, DocumentStatus, Message, QueryAnswer, ShareLink,
    Stats, UploadReceipt, UsageStats,
};
use futures_util::stream;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

use crate::{ApiError, Backend, DeltaStream, ExportFormat, QueryRequest};

/// What the next `open_stream` call does.
pub(crate) enum StreamScript {
    /// Deliver these chunks, then end the body.
    Chunks(Vec<Vec<u8>>),
    /// Deliver these chunks, then fail mid-read.
    FailAfter(Vec<Vec<u8>>),
    /// Answer with a non-success status.
    Status(u16),
    /// Never produce a chunk.
    Pending,
}

impl StreamScript {
    pub(crate) fn text(parts: &[&str]) -> Self {
        StreamScript::Chunks(parts.iter().map(|p| p.as_bytes().to_vec()).collect())
    }
}

#[derive(Default)]
pub(crate) struct FakeBackend {
    conversations: Mutex<BTreeMap<String, ConversationDetail>>,
    documents: Mutex<Vec<Document>>,
    shares: Mutex<HashMap<String, String>>,
    scripts: Mutex<VecDeque<StreamScript>>,
    history_delays: Mutex<HashMap<String, Duration>>,
    created_titles: Mutex<Vec<Option<String>>>,
    stream_requests: Mutex<Vec<QueryRequest>>,
    fail_create: AtomicBool,
    create_gate: Mutex<Option<Arc<Notify>>>,
    next_id: AtomicUsize,
    list_calls: AtomicUsize,
    documents_calls: AtomicUsize,
}

impl FakeBackend {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert_conversation(&self, id: &str, messages: Vec<Message>) {
        self.conversations.lock().unwrap().insert(
            id.to_string(),
            ConversationDetail {
                conversation: Conversation {
                    id: id.to_string(),
                    title: Some(format!("Conversation {id}")),
                    created_at: "2024-01-01T00:00:00Z".into(),
                    updated_at: "2024-01-01T00:00:00Z".into(),
                },
                messages,
            },
        );
    }

    pub(crate) fn insert_document(&self, id: &str, status: DocumentStatus) {
        self.documents.lock().unwrap().push(Document {
            id: id.to_string(),
            filename: format!("{id}.pdf"),
            status,
            chunk_count: Some(3),
            file_size: 1024,
            upload_date: None,
        });
    }

    pub(crate) fn push_script(&self, script: StreamScript) {
        self.scripts.lock().unwrap().push_back(script);
    }

    pub(crate) fn delay_history(&self, id: &str, delay: Duration) {
        self.history_delays
            .lock()
            .unwrap()
            .insert(id.to_string(), delay);
    }

    pub(crate) fn fail_create(&self) {
        self.fail_create.store(true, Ordering::SeqCst);
    }

    /// Make conversation creation wait until the returned handle is notified.
    pub(crate) fn hold_create(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.create_gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    pub(crate) fn created_titles(&self) -> Vec<Option<String>> {
        self.created_titles.lock().unwrap().clone()
    }

    pub(crate) fn stream_requests(&self) -> Vec<QueryRequest> {
        self.stream_requests.lock().unwrap().clone()
    }

    pub(crate) fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn documents_calls(&self) -> usize {
        self.documents_calls.load(Ordering::SeqCst)
    }

    fn detail(&self, id: &str) -> Result<ConversationDetail, ApiError> {
        self.conversations
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("/conversations/{id}")))
    }

    /// Store the exchange the way the server does once a stream completes.
    fn record_exchange(&self, request: &QueryRequest, answer: String) {
        let Some(id) = &request.conversation_id else {
            return;
        };
        if let Some(detail) = self.conversations.lock().unwrap().get_mut(id) {
            detail.messages.push(Message::user(request.question.clone()));
            detail.messages.push(Message::assistant(answer));
        }
    }
}

fn body(chunks: Vec<Vec<u8>>, fail: bool) -> Vec<Result<Bytes, std::io::Error>> {
    let mut items: Vec<Result<Bytes, std::io::Error>> =
        chunks.into_iter().map(|c| Ok(Bytes::from(c))).collect();
    if fail {
        items.push(Err(std::io::Error::other("connection reset by peer")));
    }
    items
}

#[async_trait]
impl Backend for FakeBackend {
    async fn create_conversation(&self, title: Option<&str>) -> Result<Conversation, ApiError> {
        let gate = self.create_gate.lock().unwrap().take();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        self.created_titles
            .lock()
            .unwrap()
            .push(title.map(String::from));
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(ApiError::Http {
                status: 500,
                body: "database unavailable".into(),
            });
        }
        let id = format!("conv-{}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        self.insert_conversation(&id, Vec::new());
        let mut conversation = self.detail(&id)?.conversation;
        conversation.title = title.map(String::from);
        Ok(conversation)
    }

    async fn conversation(&self, id: &str) -> Result<ConversationDetail, ApiError> {
        let delay = self.history_delays.lock().unwrap().get(id).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.detail(id)
    }

    async fn list_conversations(&self, search: &str) -> Result<Vec<Conversation>, ApiError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .conversations
            .lock()
            .unwrap()
            .values()
            .map(|d| d.conversation.clone())
            .filter(|c| search.is_empty() || c.display_title().contains(search))
            .collect())
    }

    async fn delete_conversation(&self, id: &str) -> Result<(), ApiError> {
        self.conversations
            .lock()
            .unwrap()
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| ApiError::NotFound(format!("/conversations/{id}")))
    }

    async fn export_conversation(
        &self,
        id: &str,
        format: ExportFormat,
    ) -> Result<String, ApiError> {
        let detail = self.detail(id)?;
        Ok(format!("{}:{}", format.as_param(), detail.messages.len()))
    }

    async fn share_conversation(&self, id: &str) -> Result<ShareLink, ApiError> {
        self.detail(id)?;
        let token = format!("share-{id}");
        self.shares
            .lock()
            .unwrap()
            .insert(token.clone(), id.to_string());
        Ok(ShareLink { share_token: token })
    }

    async fn shared_conversation(&self, token: &str) -> Result<ConversationDetail, ApiError> {
        let id = self
            .shares
            .lock()
            .unwrap()
            .get(token)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("/conversations/shared/{token}")))?;
        self.detail(&id)
    }

    async fn list_documents(&self) -> Result<Vec<Document>, ApiError> {
        self.documents_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.documents.lock().unwrap().clone())
    }

    async fn upload_document(&self, path: &Path) -> Result<UploadReceipt, ApiError> {
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let id = format!("doc-{}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        self.insert_document(&id, DocumentStatus::Pending);
        Ok(UploadReceipt {
            id,
            filename,
            status: "pending".into(),
        })
    }

    async fn delete_document(&self, id: &str) -> Result<(), ApiError> {
        self.documents.lock().unwrap().retain(|d| d.id != id);
        Ok(())
    }

    async fn stats(&self) -> Result<Stats, ApiError> {
        let conversations = self.conversations.lock().unwrap();
        Ok(Stats {
            documents: self.documents.lock().unwrap().len() as u64,
            conversations: conversations.len() as u64,
            messages: conversations.values().map(|d| d.messages.len() as u64).sum(),
        })
    }

    async fn usage(&self) -> Result<UsageStats, ApiError> {
        Ok(UsageStats::default())
    }

    async fn query(&self, request: &QueryRequest) -> Result<QueryAnswer, ApiError> {
        Ok(QueryAnswer {
            answer: format!("answer to {}", request.question),
            sources: Vec::new(),
            conversation_id: request.conversation_id.clone(),
        })
    }

    async fn open_stream(
        &self,
        request: &QueryRequest,
        cancel: CancellationToken,
    ) -> Result<DeltaStream, ApiError> {
        self.stream_requests.lock().unwrap().push(request.clone());
        let script = self
            .scripts
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(StreamScript::Chunks(Vec::new()));

        match script {
            StreamScript::Chunks(chunks) => {
                let answer = String::from_utf8_lossy(&chunks.concat()).into_owned();
                self.record_exchange(request, answer);
                Ok(DeltaStream::new(stream::iter(body(chunks, false)), cancel))
            }
            StreamScript::FailAfter(chunks) => {
                Ok(DeltaStream::new(stream::iter(body(chunks, true)), cancel))
            }
            StreamScript::Status(status) => Err(ApiError::StreamTransportFailed(format!(
                "HTTP {status}"
            ))),
            StreamScript::Pending => Ok(DeltaStream::new(
                stream::pending::<Result<Bytes, std::io::Error>>(),
                cancel,
            )),
        }
    }
}

//! Conversation engine for the DocuNova client.
//!
//! Provides:
//! - An HTTP client for the query, conversation and document endpoints
//! - Incremental decoding of chunked answer streams
//! - A session controller that owns the message log of one conversation
//! - Query caches, the persisted context-document selection, and citations

pub mod api;
pub mod auth;
pub mod cache;
pub mod citation;
pub mod history;
pub mod selection;
pub mod session;
pub mod streaming;

#[cfg(test)]
pub(crate) mod testing;

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use async_trait::async_trait;
use docunova_common::{
    Conversation, ConversationDetail, Document, DocunovaError, QueryAnswer, ShareLink, Stats,
    UploadReceipt, UsageStats,
};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

pub use api::ApiClient;
pub use auth::{StoredTokenProvider, TokenProvider, TokenSource};
pub use cache::{CacheSynchronizer, QueryCache};
pub use citation::CitationStyle;
pub use history::HistoryLoader;
pub use selection::SelectionStore;
pub use session::{RejectReason, SessionController, SessionSettings, SubmitOutcome};
pub use streaming::{DecodeFailure, DeltaStream, Utf8Decoder};

/// Everything the client needs from the query backend.
///
/// [`ApiClient`] is the HTTP implementation; tests substitute an
/// in-memory one.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn create_conversation(&self, title: Option<&str>) -> Result<Conversation, ApiError>;

    async fn conversation(&self, id: &str) -> Result<ConversationDetail, ApiError>;

    async fn list_conversations(&self, search: &str) -> Result<Vec<Conversation>, ApiError>;

    async fn delete_conversation(&self, id: &str) -> Result<(), ApiError>;

    async fn export_conversation(&self, id: &str, format: ExportFormat)
        -> Result<String, ApiError>;

    async fn share_conversation(&self, id: &str) -> Result<ShareLink, ApiError>;

    async fn shared_conversation(&self, token: &str) -> Result<ConversationDetail, ApiError>;

    async fn list_documents(&self) -> Result<Vec<Document>, ApiError>;

    async fn upload_document(&self, path: &Path) -> Result<UploadReceipt, ApiError>;

    async fn delete_document(&self, id: &str) -> Result<(), ApiError>;

    async fn stats(&self) -> Result<Stats, ApiError>;

    async fn usage(&self) -> Result<UsageStats, ApiError>;

    /// Non-streaming question answering.
    async fn query(&self, request: &QueryRequest) -> Result<QueryAnswer, ApiError>;

    /// Open the chunked answer stream for `request`.
    ///
    /// Resolves once response headers arrive; a non-success status is an
    /// error here and no body is read.
    async fn open_stream(
        &self,
        request: &QueryRequest,
        cancel: CancellationToken,
    ) -> Result<DeltaStream, ApiError>;
}

/// Body of both query endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryRequest {
    pub question: String,
    pub document_ids: Vec<String>,
    pub conversation_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Markdown,
    Text,
}

impl ExportFormat {
    /// Value of the `format` query parameter.
    pub fn as_param(self) -> &'static str {
        match self {
            ExportFormat::Markdown => "md",
            ExportFormat::Text => "txt",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_param())
    }
}

impl FromStr for ExportFormat {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "md" | "markdown" => Ok(ExportFormat::Markdown),
            "txt" | "text" => Ok(ExportFormat::Text),
            other => Err(ApiError::Parse(format!(
                "unknown export format '{other}' (expected md or txt)"
            ))),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Authentication expired")]
    AuthExpired,
    #[error("Failed to create conversation: {0}")]
    ConversationCreateFailed(String),
    #[error("Stream transport failed: {0}")]
    StreamTransportFailed(String),
    #[error("Stream decode error: {0}")]
    DecodeError(String),
    #[error("Rate limited")]
    RateLimited,
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },
    #[error("Network error: {0}")]
    Network(String),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Cancelled")]
    Cancelled,
}

impl ApiError {
    /// Whether this failure ends a stream with the fallback message.
    pub fn is_stream_failure(&self) -> bool {
        !matches!(self, ApiError::Cancelled)
    }
}

impl From<ApiError> for DocunovaError {
    fn from(err: ApiError) -> Self {
        DocunovaError::Api(err.to_string())
    }
}

//! Backend trait implementation for ApiClient.

use std::path::Path;

use async_trait::async_trait;
use docunova_common::{
    Conversation, ConversationDetail, Document, QueryAnswer, ShareLink, Stats, UploadReceipt,
    UsageStats,
};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::streaming::DeltaStream;
use crate::{ApiError, Backend, ExportFormat, QueryRequest};

use super::client::{document_mime, ApiClient};

#[async_trait]
impl Backend for ApiClient {
    async fn create_conversation(&self, title: Option<&str>) -> Result<Conversation, ApiError> {
        let body = match title {
            Some(title) => serde_json::json!({ "title": title }),
            None => serde_json::json!({}),
        };
        self.execute_json(self.http.post(self.url("/conversations")).json(&body))
            .await
            .map_err(|e| match e {
                ApiError::AuthExpired => e,
                other => ApiError::ConversationCreateFailed(other.to_string()),
            })
    }

    async fn conversation(&self, id: &str) -> Result<ConversationDetail, ApiError> {
        self.execute_json(self.http.get(self.url(&format!("/conversations/{id}"))))
            .await
    }

    async fn list_conversations(&self, search: &str) -> Result<Vec<Conversation>, ApiError> {
        let mut request = self.http.get(self.url("/conversations"));
        let search = search.trim();
        if !search.is_empty() {
            request = request.query(&[("q", search)]);
        }
        self.execute_json(request).await
    }

    async fn delete_conversation(&self, id: &str) -> Result<(), ApiError> {
        self.execute(self.http.delete(self.url(&format!("/conversations/{id}"))))
            .await?;
        Ok(())
    }

    async fn export_conversation(
        &self,
        id: &str,
        format: ExportFormat,
    ) -> Result<String, ApiError> {
        let request = self
            .http
            .get(self.url(&format!("/conversations/{id}/export")))
            .query(&[("format", format.as_param())]);
        self.execute(request)
            .await?
            .text()
            .await
            .map_err(|e| ApiError::Parse(e.to_string()))
    }

    async fn share_conversation(&self, id: &str) -> Result<ShareLink, ApiError> {
        self.execute_json(self.http.post(self.url(&format!("/conversations/{id}/share"))))
            .await
    }

    async fn shared_conversation(&self, token: &str) -> Result<ConversationDetail, ApiError> {
        self.execute_json(
            self.http
                .get(self.url(&format!("/conversations/shared/{token}"))),
        )
        .await
    }

    async fn list_documents(&self) -> Result<Vec<Document>, ApiError> {
        self.execute_json(self.http.get(self.url("/documents"))).await
    }

    async fn upload_document(&self, path: &Path) -> Result<UploadReceipt, ApiError> {
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| ApiError::Parse(format!("not a file path: {}", path.display())))?;
        let data = tokio::fs::read(path).await?;

        debug!(filename = %filename, size = data.len(), "uploading document");

        let part = reqwest::multipart::Part::bytes(data)
            .file_name(filename.clone())
            .mime_str(document_mime(&filename))
            .map_err(|e| ApiError::Parse(e.to_string()))?;
        let form = reqwest::multipart::Form::new().part("file", part);

        self.execute_json(self.http.post(self.url("/documents/upload")).multipart(form))
            .await
    }

    async fn delete_document(&self, id: &str) -> Result<(), ApiError> {
        self.execute(self.http.delete(self.url(&format!("/documents/{id}"))))
            .await?;
        Ok(())
    }

    async fn stats(&self) -> Result<Stats, ApiError> {
        self.execute_json(self.http.get(self.url("/stats"))).await
    }

    async fn usage(&self) -> Result<UsageStats, ApiError> {
        self.execute_json(self.http.get(self.url("/stats/usage"))).await
    }

    async fn query(&self, request: &QueryRequest) -> Result<QueryAnswer, ApiError> {
        self.execute_json(self.http.post(self.url("/query")).json(request))
            .await
    }

    async fn open_stream(
        &self,
        request: &QueryRequest,
        cancel: CancellationToken,
    ) -> Result<DeltaStream, ApiError> {
        debug!(
            conversation_id = ?request.conversation_id,
            documents = request.document_ids.len(),
            "opening answer stream"
        );

        let response = self
            .send(self.http.post(self.url("/query/stream")).json(request))
            .await
            .map_err(|e| ApiError::StreamTransportFailed(e.to_string()))?;

        let response = self.check_status(response).await.map_err(|e| match e {
            ApiError::AuthExpired => e,
            other => ApiError::StreamTransportFailed(other.to_string()),
        })?;

        Ok(DeltaStream::from_response(response, cancel))
    }
}

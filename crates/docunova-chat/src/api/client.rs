//! ApiClient struct, request building, and response status handling.

use std::sync::Arc;
use std::time::Duration;

use docunova_config::schema::ApiConfig;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::auth::TokenProvider;
use crate::ApiError;

pub(crate) const API_PREFIX: &str = "/api/v1";

/// Error bodies are cut to this many characters.
const ERROR_BODY_LIMIT: usize = 200;

/// DocuNova REST client.
pub struct ApiClient {
    pub(crate) base_url: String,
    pub(crate) request_timeout: Duration,
    pub(crate) http: reqwest::Client,
    pub(crate) tokens: Arc<dyn TokenProvider>,
}

impl ApiClient {
    pub fn new(config: &ApiConfig, tokens: Arc<dyn TokenProvider>) -> Result<Self, ApiError> {
        // Only the connect timeout is client-wide; answer streams are unbounded.
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs.into()))
            .build()
            .map_err(|e| ApiError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            request_timeout: Duration::from_secs(config.request_timeout_secs.into()),
            http,
            tokens,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{API_PREFIX}{path}", self.base_url)
    }

    /// Attach auth and send. Status is not checked here.
    pub(crate) async fn send(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, ApiError> {
        let request = match self.tokens.token().await {
            Some(token) => request.bearer_auth(token),
            None => request,
        };
        request.send().await.map_err(|e| {
            if e.is_timeout() {
                ApiError::Network(format!("request timed out: {e}"))
            } else {
                ApiError::Network(e.to_string())
            }
        })
    }

    /// Send a bounded (non-streaming) request and check its status.
    pub(crate) async fn execute(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, ApiError> {
        let response = self.send(request.timeout(self.request_timeout)).await?;
        self.check_status(response).await
    }

    pub(crate) async fn execute_json<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = self.execute(request).await?;
        response
            .json()
            .await
            .map_err(|e| ApiError::Parse(e.to_string()))
    }

    /// Map non-success statuses to errors. A 401 also forgets the cached token.
    pub(crate) async fn check_status(
        &self,
        response: reqwest::Response,
    ) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let path = response.url().path().to_string();
        match status {
            reqwest::StatusCode::UNAUTHORIZED => {
                warn!(path = %path, "backend rejected credentials, clearing cached token");
                self.tokens.clear_cached();
                Err(ApiError::AuthExpired)
            }
            reqwest::StatusCode::TOO_MANY_REQUESTS => Err(ApiError::RateLimited),
            reqwest::StatusCode::NOT_FOUND => Err(ApiError::NotFound(path)),
            _ => {
                let text = response.text().await.unwrap_or_default();
                let body = text.chars().take(ERROR_BODY_LIMIT).collect::<String>();
                debug!(status = status.as_u16(), path = %path, "backend error");
                Err(ApiError::Http {
                    status: status.as_u16(),
                    body,
                })
            }
        }
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

/// MIME type for an uploaded document, from its extension.
pub(crate) fn document_mime(filename: &str) -> &'static str {
    match filename
        .rsplit('.')
        .next()
        .map(|ext| ext.to_ascii_lowercase())
        .as_deref()
    {
        Some("pdf") => "application/pdf",
        Some("docx") => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        Some("md") => "text/markdown",
        Some("txt") => "text/plain",
        Some("html") | Some("htm") => "text/html",
        _ => "application/octet-stream",
    }
}

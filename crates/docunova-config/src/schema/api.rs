//! Backend connection settings.

use serde::{Deserialize, Serialize};

/// Where the query backend lives and how long to wait for it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the backend; `/api/v1/...` paths are appended to it.
    pub base_url: String,
    /// Origin of the web front-end, used to build share links.
    pub web_origin: String,
    /// TCP/TLS connect timeout in seconds (valid range: 1-120).
    pub connect_timeout_secs: u32,
    /// Timeout for non-streaming requests in seconds (valid range: 1-600).
    /// Streaming answers are not bounded by it.
    pub request_timeout_secs: u32,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".into(),
            web_origin: "http://localhost:5173".into(),
            connect_timeout_secs: 10,
            request_timeout_secs: 60,
        }
    }
}

use serde::{Deserialize, Serialize};

use super::message::{Message, Source};

/// Conversation summary as listed and created by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

impl Conversation {
    /// Title for display, falling back to the id when the backend has none.
    pub fn display_title(&self) -> String {
        match self.title.as_deref() {
            Some(t) if !t.trim().is_empty() => t.to_string(),
            _ => format!("Conversation {}", self.id),
        }
    }
}

/// Conversation with its durable, ordered message log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationDetail {
    #[serde(flatten)]
    pub conversation: Conversation,
    #[serde(default)]
    pub messages: Vec<Message>,
}

/// Response of the non-streaming query endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryAnswer {
    pub answer: String,
    #[serde(default)]
    pub sources: Vec<Source>,
    #[serde(default)]
    pub conversation_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareLink {
    pub share_token: String,
}

impl ShareLink {
    /// Public URL of the shared view, relative to the web front-end origin.
    pub fn url(&self, origin: &str) -> String {
        format!("{}/shared/{}", origin.trim_end_matches('/'), self.share_token)
    }
}

/// Per-user counters from the stats endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Stats {
    pub documents: u64,
    pub conversations: u64,
    pub messages: u64,
}

/// Token quota snapshot from the usage endpoint.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UsageStats {
    pub daily_remaining: i64,
    pub daily_limit: i64,
    pub daily_used: i64,
    pub daily_percentage: f64,
    pub monthly_remaining: i64,
    pub monthly_limit: i64,
    pub monthly_used: i64,
    pub monthly_percentage: f64,
    pub total_used: i64,
    pub total_requests: i64,
    pub resets_in: String,
}

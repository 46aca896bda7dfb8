use serde::{Deserialize, Serialize};

/// Conversation session behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Characters of the question kept in an auto-created title (1-200).
    pub title_max_chars: u32,
    /// Appended to every auto-created title.
    pub title_suffix: String,
    /// Assistant message appended when a stream fails.
    pub stream_error_message: String,
    /// Buffered session events per subscriber (16-65536).
    pub event_capacity: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            title_max_chars: 30,
            title_suffix: "...".into(),
            stream_error_message:
                "I apologize, but I encountered an error while streaming the response.".into(),
            event_capacity: 1024,
        }
    }
}

/// Presentation settings for front-ends.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub assistant_name: String,
    /// One of `default`, `apa`, `mla`.
    pub citation_style: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            assistant_name: "DocuNova".into(),
            citation_style: "default".into(),
        }
    }
}

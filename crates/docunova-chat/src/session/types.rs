//! Session settings, submission outcomes, and the stream guard.

use docunova_config::schema::SessionConfig;

use crate::ApiError;

use super::manager::SessionController;

/// Prefix of the assistant message appended when a conversation cannot be created.
pub const CREATE_FAILED_MESSAGE: &str = "I apologize, but I could not start a new conversation.";

/// Tunables of a [`SessionController`].
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub title_max_chars: usize,
    pub title_suffix: String,
    pub stream_error_message: String,
}

impl SessionSettings {
    /// Title for a conversation auto-created from `question`.
    ///
    /// Truncation counts characters, not bytes; the suffix is always added.
    pub fn conversation_title(&self, question: &str) -> String {
        let mut title: String = question.chars().take(self.title_max_chars).collect();
        title.push_str(&self.title_suffix);
        title
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self::from(&SessionConfig::default())
    }
}

impl From<&SessionConfig> for SessionSettings {
    fn from(config: &SessionConfig) -> Self {
        Self {
            title_max_chars: config.title_max_chars as usize,
            title_suffix: config.title_suffix.clone(),
            stream_error_message: config.stream_error_message.clone(),
        }
    }
}

/// Why a submission was refused without touching the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    EmptyQuestion,
    /// A stream is already open on this controller.
    Busy,
}

/// Result of [`SessionController::submit_query`].
#[derive(Debug)]
pub enum SubmitOutcome {
    Rejected(RejectReason),
    Completed { conversation_id: String },
    /// The failure is already reflected in the message log.
    Failed(ApiError),
    /// The session switched away while the answer was in flight.
    Cancelled,
}

impl SubmitOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, SubmitOutcome::Completed { .. })
    }
}

/// Returns the controller to `Idle` when a submission ends, however it ends
/// (early return, error, or the future being dropped).
pub(crate) struct StreamGuard<'a> {
    controller: &'a SessionController,
    epoch: u64,
}

impl<'a> StreamGuard<'a> {
    pub(crate) fn new(controller: &'a SessionController, epoch: u64) -> Self {
        Self { controller, epoch }
    }
}

impl Drop for StreamGuard<'_> {
    fn drop(&mut self) {
        self.controller.finish_stream(self.epoch);
    }
}

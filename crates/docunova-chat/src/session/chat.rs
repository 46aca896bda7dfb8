//! Async session operations: submitting questions and loading history.

use docunova_common::{new_correlation_id, Event, Message, Role, StreamState};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::{ApiError, QueryRequest};

use super::manager::SessionController;
use super::types::{RejectReason, StreamGuard, SubmitOutcome, CREATE_FAILED_MESSAGE};

impl SessionController {
    /// Ask `text` in the active conversation, creating one first if needed.
    ///
    /// The user message is in the log before this first suspends. The call
    /// resolves once the answer stream ended; deltas are observable through
    /// [`SessionController::subscribe`] meanwhile.
    pub async fn submit_query(&self, text: &str) -> SubmitOutcome {
        if text.trim().is_empty() {
            return SubmitOutcome::Rejected(RejectReason::EmptyQuestion);
        }

        let (epoch, cancel, active_id) = {
            let mut state = self.state();
            if state.stream_state != StreamState::Idle {
                return SubmitOutcome::Rejected(RejectReason::Busy);
            }
            state.messages.push(Message::user(text));
            let index = state.messages.len() - 1;
            self.publish(Event::MessageAppended {
                index,
                role: Role::User,
            });
            self.set_stream_state(&mut state, StreamState::Streaming);

            let cancel = CancellationToken::new();
            state.cancel = Some(cancel.clone());
            (state.epoch, cancel, state.active_conversation_id.clone())
        };
        let _guard = StreamGuard::new(self, epoch);
        let request_id = new_correlation_id();

        let conversation_id = match active_id {
            Some(id) => id,
            None => match self.create_conversation(text, epoch, &cancel).await {
                Ok(id) => id,
                Err(outcome) => return outcome,
            },
        };

        let Some(index) = self.append_if_current(epoch, Message::assistant("")) else {
            return SubmitOutcome::Cancelled;
        };

        let request = QueryRequest {
            question: text.to_string(),
            document_ids: self.inner.selection.ids(),
            conversation_id: Some(conversation_id.clone()),
        };
        info!(
            request_id = %request_id,
            conversation_id = %conversation_id,
            documents = request.document_ids.len(),
            "submitting question"
        );

        match self.stream_answer(&request, index, epoch, cancel).await {
            Ok(()) => {
                {
                    let mut state = self.state();
                    if state.epoch == epoch {
                        self.set_stream_state(&mut state, StreamState::Finalizing);
                    }
                }
                if let Some(detail) = self.inner.cache.refresh_conversation(&conversation_id).await {
                    self.adopt_durable_log(epoch, &conversation_id, detail.messages);
                }
                info!(request_id = %request_id, "answer complete");
                SubmitOutcome::Completed { conversation_id }
            }
            Err(e) if !e.is_stream_failure() => {
                debug!(request_id = %request_id, "answer stream cancelled");
                SubmitOutcome::Cancelled
            }
            Err(e) => {
                warn!(request_id = %request_id, "answer stream failed: {e}");
                let fallback = Message::assistant(self.inner.settings.stream_error_message.clone());
                self.append_if_current(epoch, fallback);
                SubmitOutcome::Failed(e)
            }
        }
    }

    async fn create_conversation(
        &self,
        question: &str,
        epoch: u64,
        cancel: &CancellationToken,
    ) -> Result<String, SubmitOutcome> {
        let title = self.inner.settings.conversation_title(question);
        let created = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(SubmitOutcome::Cancelled),
            result = self.inner.backend.create_conversation(Some(&title)) => result,
        };

        match created {
            Ok(conversation) => {
                {
                    let mut state = self.state();
                    if state.epoch != epoch {
                        return Err(SubmitOutcome::Cancelled);
                    }
                    state.active_conversation_id = Some(conversation.id.clone());
                    self.publish(Event::ConversationChanged(Some(conversation.id.clone())));
                }
                info!(conversation_id = %conversation.id, title = %title, "conversation created");
                self.inner.cache.invalidate_conversation_list();
                Ok(conversation.id)
            }
            Err(e) => {
                let err = match e {
                    ApiError::ConversationCreateFailed(_) => e,
                    other => ApiError::ConversationCreateFailed(other.to_string()),
                };
                warn!("{err}");
                let message = Message::assistant(format!("{CREATE_FAILED_MESSAGE} ({err})"));
                self.append_if_current(epoch, message);
                Err(SubmitOutcome::Failed(err))
            }
        }
    }

    /// Pump deltas into the assistant message at `index` until the body ends.
    async fn stream_answer(
        &self,
        request: &QueryRequest,
        index: usize,
        epoch: u64,
        cancel: CancellationToken,
    ) -> Result<(), ApiError> {
        let opened = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(ApiError::Cancelled),
            result = self.inner.backend.open_stream(request, cancel.clone()) => result,
        };
        let mut stream = opened?;

        let mut answer = String::new();
        while let Some(delta) = stream.next_delta().await {
            let delta = delta?;
            answer.push_str(&delta);
            if !self.apply_delta(epoch, index, &answer, delta) {
                return Err(ApiError::Cancelled);
            }
        }
        debug!(bytes = stream.bytes_received(), "answer stream drained");
        Ok(())
    }

    /// Switch to conversation `id` and load its stored messages.
    ///
    /// Any open stream is cancelled. The loaded messages, or the load
    /// error, are discarded if another load or reset happened while they
    /// were in flight.
    pub async fn load_conversation(&self, id: &str) -> Result<(), ApiError> {
        let epoch = self.switch_to(Some(id.to_string()));
        let loaded = self.inner.history.load(id).await;

        let mut state = self.state();
        if state.epoch != epoch || state.active_conversation_id.as_deref() != Some(id) {
            debug!(conversation_id = id, "discarding stale history");
            return Ok(());
        }
        let messages = loaded?;
        let count = messages.len();
        state.messages = messages;
        self.publish(Event::MessagesReplaced { count });
        Ok(())
    }
}

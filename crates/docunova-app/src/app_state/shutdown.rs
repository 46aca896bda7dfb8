//! Shutdown: abandon any open answer stream.

use docunova_common::StreamState;

use super::core::DocunovaApp;

impl DocunovaApp {
    pub fn shutdown(&self) {
        if self.session.stream_state() != StreamState::Idle {
            tracing::info!("Cancelling open answer stream");
            self.session.reset_to_new_session();
        }
        tracing::info!("Shutdown complete");
    }
}

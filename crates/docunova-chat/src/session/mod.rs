//! Conversation session control.
//!
//! A `SessionController` holds the active conversation id and its message
//! log, turns a question into a created conversation plus a streamed
//! answer, and keeps the caches informed of what changed.

mod chat;
mod manager;
mod types;


pub use manager::SessionController;
pub use types::{RejectReason, SessionSettings, SubmitOutcome, CREATE_FAILED_MESSAGE};

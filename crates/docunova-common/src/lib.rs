pub mod errors;
pub mod events;
pub mod id;
pub mod types;

pub use errors::{ConfigError, DocunovaError, PlatformError};
pub use events::{Event, EventBus};
pub use id::new_correlation_id;
pub use types::{
    Conversation, ConversationDetail, Document, DocumentStatus, Message, QueryAnswer, Role,
    ShareLink, Source, Stats, StreamState, UploadReceipt, UsageStats,
};

pub type Result<T> = std::result::Result<T, DocunovaError>;

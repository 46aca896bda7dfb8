mod conversation;
mod document;
mod message;

pub use conversation::*;
pub use document::*;
pub use message::*;

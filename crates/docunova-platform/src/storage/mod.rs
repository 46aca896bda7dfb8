//! Key-value persistence for small pieces of client state.
//!
//! One store is injected everywhere state must survive a restart (the
//! context selection, the cached bearer token, UI preferences), so no
//! component touches the filesystem on its own.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use docunova_common::PlatformError;

/// Synchronous string key-value store.
///
/// Each call is atomic with respect to other calls on the same store.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&self, key: &str, value: &str) -> Result<(), PlatformError>;

    fn remove(&self, key: &str) -> Result<(), PlatformError>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for std::sync::Arc<T> {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PlatformError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), PlatformError> {
        (**self).remove(key)
    }
}

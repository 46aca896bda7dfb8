pub mod paths;
pub mod preferences;
pub mod storage;

pub use paths::{config_dir, data_dir, ensure_dirs, state_file};
pub use preferences::{Preferences, Theme};
pub use storage::{FileStore, KeyValueStore, MemoryStore};

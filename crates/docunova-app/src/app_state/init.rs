//! Persistent state selection at startup.

use std::path::PathBuf;
use std::sync::Arc;

use docunova_common::PlatformError;
use docunova_config::schema::DocunovaConfig;
use docunova_platform::{FileStore, KeyValueStore, MemoryStore};

/// Where the key-value state lives for this run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateLocation {
    Memory,
    File(PathBuf),
}

impl StateLocation {
    /// `--ephemeral` wins, then `--state-file`, then `[storage] state_file`,
    /// then the platform data dir.
    pub fn resolve(
        ephemeral: bool,
        override_path: Option<PathBuf>,
        config: &DocunovaConfig,
    ) -> Result<Self, PlatformError> {
        if ephemeral {
            return Ok(StateLocation::Memory);
        }
        if let Some(path) = override_path {
            return Ok(StateLocation::File(path));
        }
        let configured = config.storage.state_file.trim();
        if !configured.is_empty() {
            return Ok(StateLocation::File(PathBuf::from(configured)));
        }
        Ok(StateLocation::File(docunova_platform::state_file()?))
    }

    pub fn open(&self) -> Result<Arc<dyn KeyValueStore>, PlatformError> {
        match self {
            StateLocation::Memory => {
                tracing::info!("Using in-memory state");
                Ok(Arc::new(MemoryStore::new()))
            }
            StateLocation::File(path) => {
                let store = FileStore::open(path)?;
                tracing::info!(path = %path.display(), "State file opened");
                Ok(Arc::new(store))
            }
        }
    }
}

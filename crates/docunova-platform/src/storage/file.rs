use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use docunova_common::PlatformError;
use tracing::{debug, warn};

use super::KeyValueStore;

/// JSON-file backed store.
///
/// The whole map is kept in memory and rewritten on every mutation
/// (write to a sibling temp file, then rename), so a crash mid-write
/// leaves the previous state intact.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileStore {
    /// Open the store at `path`, creating parent directories as needed.
    ///
    /// A missing file starts empty. A corrupt file is logged and also
    /// starts empty; it is overwritten on the next mutation.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, PlatformError> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                PlatformError::StorageError(format!(
                    "failed to create {}: {e}",
                    parent.display()
                ))
            })?;
        }

        let entries = match std::fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(map) => map,
                Err(e) => {
                    warn!("state file {} is corrupt, starting empty: {e}", path.display());
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                return Err(PlatformError::StorageError(format!(
                    "failed to read {}: {e}",
                    path.display()
                )))
            }
        };

        debug!(path = %path.display(), keys = entries.len(), "opened state store");
        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn mutate(
        &self,
        f: impl FnOnce(&mut BTreeMap<String, String>),
    ) -> Result<(), PlatformError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| PlatformError::StorageError("state store poisoned".into()))?;
        let mut next = entries.clone();
        f(&mut next);
        write_atomically(&self.path, &next)?;
        *entries = next;
        Ok(())
    }
}

fn write_atomically(path: &Path, entries: &BTreeMap<String, String>) -> Result<(), PlatformError> {
    let json = serde_json::to_string_pretty(entries)
        .map_err(|e| PlatformError::StorageError(e.to_string()))?;
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, json).map_err(|e| {
        PlatformError::StorageError(format!("failed to write {}: {e}", tmp.display()))
    })?;
    std::fs::rename(&tmp, path).map_err(|e| {
        PlatformError::StorageError(format!("failed to replace {}: {e}", path.display()))
    })
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PlatformError> {
        self.mutate(|entries| {
            entries.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> Result<(), PlatformError> {
        self.mutate(|entries| {
            entries.remove(key);
        })
    }
}

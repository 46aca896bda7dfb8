use std::path::PathBuf;

use docunova_common::PlatformError;

pub(super) const APP_NAME: &str = "docunova";

/// Returns the platform-specific configuration directory for DocuNova.
///
/// - macOS: `~/Library/Application Support/docunova`
/// - Linux: `$XDG_CONFIG_HOME/docunova` (defaults to `~/.config/docunova`)
/// - Windows: `%APPDATA%\docunova`
pub fn config_dir() -> Result<PathBuf, PlatformError> {
    Ok(dirs::config_dir()
        .ok_or_else(|| PlatformError::PathError("could not determine config directory".into()))?
        .join(APP_NAME))
}

/// Returns the platform-specific data directory for DocuNova.
///
/// - macOS: `~/Library/Application Support/docunova`
/// - Linux: `$XDG_DATA_HOME/docunova` (defaults to `~/.local/share/docunova`)
/// - Windows: `%APPDATA%\docunova`
pub fn data_dir() -> Result<PathBuf, PlatformError> {
    Ok(dirs::data_dir()
        .ok_or_else(|| PlatformError::PathError("could not determine data directory".into()))?
        .join(APP_NAME))
}

/// Returns the path of the persisted client state (selection, token, prefs).
///
/// Located at `data_dir()/state.json`.
pub fn state_file() -> Result<PathBuf, PlatformError> {
    Ok(data_dir()?.join("state.json"))
}

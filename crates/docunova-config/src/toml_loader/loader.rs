//! Core TOML config loading: read from path or platform default.

use crate::schema::DocunovaConfig;
use crate::validation;
use docunova_common::ConfigError;
use std::path::Path;
use tracing::{info, warn};

use super::paths::{create_default_config, default_config_path};

/// Environment variable that overrides `api.base_url`.
pub const API_URL_ENV: &str = "DOCUNOVA_API_URL";

/// Environment variable that seeds the bearer token.
pub const TOKEN_ENV: &str = "DOCUNOVA_TOKEN";

/// Load config from a specific TOML file path.
///
/// Deserializes the file using serde defaults for any missing fields.
/// After loading, the config is validated; if validation fails, a warning
/// is logged and the parsed config is returned as-is.
pub fn load_from_path(path: &Path) -> Result<DocunovaConfig, ConfigError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::ParseError(format!("failed to read {}: {e}", path.display())))?;

    let config: DocunovaConfig = toml::from_str(&content)
        .map_err(|e| ConfigError::ParseError(format!("failed to parse TOML: {e}")))?;

    if let Err(e) = validation::validate(&config) {
        warn!("config validation warning: {e}");
    }

    info!("loaded config from {}", path.display());
    Ok(config)
}

/// Load config from `path`, writing the commented template there first if
/// the file does not exist yet.
pub fn load_or_create(path: &Path) -> Result<DocunovaConfig, ConfigError> {
    if !path.exists() {
        info!("no config found at {}, creating default", path.display());
        create_default_config(path)?;
        return Ok(DocunovaConfig::default());
    }
    load_from_path(path)
}

/// Load config from the platform-specific default path.
///
/// On macOS: `~/Library/Application Support/docunova/config.toml`
/// On Linux: `~/.config/docunova/config.toml`
pub fn load_default() -> Result<DocunovaConfig, ConfigError> {
    let path = default_config_path()?;
    load_or_create(&path)
}

/// Apply environment overrides on top of a loaded config.
///
/// `api_url` is the value of [`API_URL_ENV`], passed in by the caller.
pub fn apply_env_overrides(config: &mut DocunovaConfig, api_url: Option<String>) {
    if let Some(url) = api_url.filter(|u| !u.trim().is_empty()) {
        info!(%url, "api.base_url overridden from environment");
        config.api.base_url = url.trim().trim_end_matches('/').to_string();
    }
}

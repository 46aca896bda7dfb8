//! DocuNova client configuration.
//!
//! TOML-based configuration with full validation. All config sections use
//! sensible defaults so partial configs work out of the box.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use docunova_config::{load_config, config_to_json};
//!
//! let config = load_config(None).expect("failed to load config");
//! println!("{}", config_to_json(&config));
//! ```

pub mod schema;
pub mod toml_loader;
pub mod validation;

pub use schema::{DocunovaConfig, LogLevel, CONFIG_SCHEMA_VERSION};
pub use toml_loader::{API_URL_ENV, TOKEN_ENV};

use std::path::Path;

use docunova_common::ConfigError;

/// Load config from `path` (or the platform default), apply environment
/// overrides, and validate the result.
pub fn load_config(path: Option<&Path>) -> Result<DocunovaConfig, ConfigError> {
    load_config_with(path, std::env::var(API_URL_ENV).ok())
}

/// Defaults with environment overrides applied, for when [`load_config`]
/// fails.
pub fn fallback_config() -> DocunovaConfig {
    fallback_config_with(std::env::var(API_URL_ENV).ok())
}

fn load_config_with(
    path: Option<&Path>,
    api_url: Option<String>,
) -> Result<DocunovaConfig, ConfigError> {
    let mut config = match path {
        Some(p) => toml_loader::load_or_create(p)?,
        None => toml_loader::load_default()?,
    };

    toml_loader::apply_env_overrides(&mut config, api_url);

    validation::validate(&config)?;
    Ok(config)
}

fn fallback_config_with(api_url: Option<String>) -> DocunovaConfig {
    let mut config = DocunovaConfig::default();
    toml_loader::apply_env_overrides(&mut config, api_url);
    config
}

/// Serialize a config to a pretty-printed JSON string.
pub fn config_to_json(config: &DocunovaConfig) -> String {
    serde_json::to_string_pretty(config)
        .unwrap_or_else(|e| format!("{{\"error\": \"failed to serialize config: {e}\"}}"))
}

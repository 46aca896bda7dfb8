//! Tests for TOML config loading, creation, and path resolution.

use super::*;
use std::path::Path;

#[test]
fn load_from_nonexistent_returns_parse_error() {
    let result = load_from_path(Path::new("/tmp/nonexistent_docunova_config.toml"));
    let err = result.unwrap_err();
    assert!(matches!(err, docunova_common::ConfigError::ParseError(_)));
}

#[test]
fn load_valid_partial_toml() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
[api]
base_url = "https://rag.example.com"

[session]
title_max_chars = 40
"#,
    )
    .unwrap();

    let config = load_from_path(&path).unwrap();
    assert_eq!(config.api.base_url, "https://rag.example.com");
    assert_eq!(config.session.title_max_chars, 40);
    // Defaults preserved
    assert_eq!(config.session.title_suffix, "...");
    assert_eq!(config.display.assistant_name, "DocuNova");
}

#[test]
fn load_invalid_toml_returns_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "this is not valid toml {{{").unwrap();

    let err = load_from_path(&path).unwrap_err();
    assert!(matches!(err, docunova_common::ConfigError::ParseError(_)));
}

#[test]
fn invalid_values_are_returned_with_warning() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[session]\ntitle_max_chars = 0\n").unwrap();

    let config = load_from_path(&path).unwrap();
    assert_eq!(config.session.title_max_chars, 0);
}

#[test]
fn load_or_create_writes_template_once() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("docunova").join("config.toml");

    let config = load_or_create(&path).unwrap();
    assert!(path.exists());
    assert_eq!(config.api.base_url, "http://127.0.0.1:8000");

    std::fs::write(&path, "[display]\ncitation_style = \"mla\"\n").unwrap();
    let config = load_or_create(&path).unwrap();
    assert_eq!(config.display.citation_style, "mla");
}

#[test]
fn default_config_toml_is_valid() {
    use super::template::default_config_toml;
    use crate::schema::DocunovaConfig;

    let config: DocunovaConfig = toml::from_str(&default_config_toml()).unwrap();
    assert!(crate::validation::validate(&config).is_ok());
}

#[test]
fn env_override_replaces_base_url() {
    let mut config = crate::schema::DocunovaConfig::default();
    apply_env_overrides(&mut config, Some("https://rag.example.com/".into()));
    assert_eq!(config.api.base_url, "https://rag.example.com");
}

#[test]
fn blank_env_override_is_ignored() {
    let mut config = crate::schema::DocunovaConfig::default();
    apply_env_overrides(&mut config, Some("  ".into()));
    assert_eq!(config.api.base_url, "http://127.0.0.1:8000");
    apply_env_overrides(&mut config, None);
    assert_eq!(config.api.base_url, "http://127.0.0.1:8000");
}

#[test]
fn default_config_path_is_reasonable() {
    if let Ok(path) = default_config_path() {
        let path_str = path.to_string_lossy();
        assert!(path_str.contains("docunova"));
        assert!(path_str.ends_with("config.toml"));
    }
}

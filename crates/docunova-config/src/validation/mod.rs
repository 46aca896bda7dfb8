//! Full configuration validation.
//!
//! Each section has its own validator; this orchestrator calls them all
//! and collects errors into a single `ConfigError`.

mod helpers;


use crate::schema::DocunovaConfig;
use docunova_common::ConfigError;

use helpers::{validate_non_empty, validate_one_of, validate_range};

/// Citation style names accepted in `[display] citation_style`.
pub const CITATION_STYLES: &[&str] = &["default", "apa", "mla"];

/// Run all validations on a config, collecting all errors.
pub fn validate(config: &DocunovaConfig) -> Result<(), ConfigError> {
    let mut errors: Vec<String> = Vec::new();

    validate_api(&mut errors, config);
    validate_session(&mut errors, config);
    validate_display(&mut errors, config);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(errors.join("; ")))
    }
}

fn validate_api(errors: &mut Vec<String>, config: &DocunovaConfig) {
    let api = &config.api;
    if !(api.base_url.starts_with("http://") || api.base_url.starts_with("https://")) {
        errors.push(format!(
            "api.base_url = {:?} must start with http:// or https://",
            api.base_url
        ));
    }
    validate_range(
        errors,
        "api.connect_timeout_secs",
        api.connect_timeout_secs,
        1,
        120,
    );
    validate_range(
        errors,
        "api.request_timeout_secs",
        api.request_timeout_secs,
        1,
        600,
    );
}

fn validate_session(errors: &mut Vec<String>, config: &DocunovaConfig) {
    let session = &config.session;
    validate_range(
        errors,
        "session.title_max_chars",
        session.title_max_chars,
        1,
        200,
    );
    validate_range(
        errors,
        "session.event_capacity",
        session.event_capacity,
        16,
        65536,
    );
    validate_non_empty(
        errors,
        "session.stream_error_message",
        &session.stream_error_message,
    );
}

fn validate_display(errors: &mut Vec<String>, config: &DocunovaConfig) {
    validate_non_empty(
        errors,
        "display.assistant_name",
        &config.display.assistant_name,
    );
    validate_one_of(
        errors,
        "display.citation_style",
        &config.display.citation_style,
        CITATION_STYLES,
    );
}

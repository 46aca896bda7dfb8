//! Default TOML config template with inline documentation comments.

/// Generate the default TOML config content with comments.
pub(crate) fn default_config_toml() -> String {
    r##"# DocuNova client configuration
# Schema version 1
# Only override what you want to change -- missing fields use defaults.

[api]
# base_url = "http://127.0.0.1:8000"     # DOCUNOVA_API_URL overrides this
# web_origin = "http://localhost:5173"   # used to build share links
# connect_timeout_secs = 10              # 1-120
# request_timeout_secs = 60              # 1-600, streaming answers are unbounded

[session]
# title_max_chars = 30                   # 1-200
# title_suffix = "..."
# stream_error_message = "I apologize, but I encountered an error while streaming the response."
# event_capacity = 1024                  # 16-65536

[display]
# assistant_name = "DocuNova"
# citation_style = "default"             # default, apa, mla

[logging]
# level = "INFO"                         # TRACE, DEBUG, INFO, WARNING, ERROR

[storage]
# state_file = ""                        # empty = platform data dir
"##
    .to_string()
}

//! TOML config file loading and creation.

mod loader;
mod paths;
mod template;

#[cfg(test)]
mod tests;

pub use loader::{
    apply_env_overrides, load_default, load_from_path, load_or_create, API_URL_ENV, TOKEN_ENV,
};
pub use paths::{create_default_config, default_config_path};

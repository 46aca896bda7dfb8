//! Configuration schema types for DocuNova.
//!
//! All structs use `serde(default)` so partial configs work correctly.

mod api;
mod session;
mod system;

pub use api::*;
pub use session::*;
pub use system::*;

use serde::{Deserialize, Serialize};

/// Current config schema version.
pub const CONFIG_SCHEMA_VERSION: u32 = 1;

/// Root configuration for the DocuNova client.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DocunovaConfig {
    pub api: ApiConfig,
    pub session: SessionConfig,
    pub display: DisplayConfig,
    pub logging: LoggingConfig,
    pub storage: StorageConfig,
}

//! Persisted UI preferences: colour theme and sidebar state.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use docunova_common::PlatformError;
use serde::{Deserialize, Serialize};

use crate::storage::KeyValueStore;

pub const THEME_KEY: &str = "theme";
pub const SIDEBAR_COLLAPSED_KEY: &str = "sidebarCollapsed";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
            Theme::System => "system",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = PlatformError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            "system" => Ok(Theme::System),
            other => Err(PlatformError::StorageError(format!(
                "unknown theme '{other}' (expected light, dark or system)"
            ))),
        }
    }
}

/// Typed view over the preference keys of a [`KeyValueStore`].
#[derive(Clone)]
pub struct Preferences {
    store: Arc<dyn KeyValueStore>,
}

impl Preferences {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Stored theme; unreadable values fall back to [`Theme::System`].
    pub fn theme(&self) -> Theme {
        self.store
            .get(THEME_KEY)
            .and_then(|v| v.parse().ok())
            .unwrap_or_default()
    }

    pub fn set_theme(&self, theme: Theme) -> Result<(), PlatformError> {
        self.store.set(THEME_KEY, theme.as_str())
    }

    pub fn sidebar_collapsed(&self) -> bool {
        self.store.get(SIDEBAR_COLLAPSED_KEY).as_deref() == Some("1")
    }

    pub fn set_sidebar_collapsed(&self, collapsed: bool) -> Result<(), PlatformError> {
        self.store
            .set(SIDEBAR_COLLAPSED_KEY, if collapsed { "1" } else { "0" })
    }
}

impl fmt::Debug for Preferences {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Preferences")
            .field("theme", &self.theme())
            .field("sidebar_collapsed", &self.sidebar_collapsed())
            .finish()
    }
}

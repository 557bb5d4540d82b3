//! Light/dark theme preference
//!
//! Stored as the plain string `light` or `dark` in its own slot. A missing
//! or unreadable value falls back to light.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::StorageError;
use crate::storage::SlotStorage;

/// Slot holding the theme string
pub const THEME_SLOT: &str = "theme";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    /// The other theme
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(format!("unknown theme: {}", other)),
        }
    }
}

/// Read the stored preference
pub fn load(storage: &impl SlotStorage) -> Theme {
    match storage.read(THEME_SLOT) {
        Ok(Some(value)) => value.parse().unwrap_or_else(|e| {
            tracing::warn!("Ignoring stored theme: {}", e);
            Theme::default()
        }),
        Ok(None) => Theme::default(),
        Err(e) => {
            tracing::warn!("Failed to read theme preference: {}", e);
            Theme::default()
        }
    }
}

/// Persist the preference
pub fn save(storage: &mut impl SlotStorage, theme: Theme) -> Result<(), StorageError> {
    storage.write(THEME_SLOT, theme.as_str())
}

//! Persisted viewer preferences (theme, color theme, sidebar state).
//!
//! Only explicit user actions write this file; refresh cycles never touch it.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use beacon_core::write_json_pretty_atomic;
use serde::{Deserialize, Serialize};

pub const PREFERENCES_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    #[default]
    Light,
    Dark,
}

impl ThemeMode {
    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }
}

fn preferences_schema_version() -> u32 {
    PREFERENCES_SCHEMA_VERSION
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientPreferences {
    #[serde(default = "preferences_schema_version")]
    pub schema_version: u32,
    #[serde(default)]
    pub theme: ThemeMode,
    #[serde(default)]
    pub color_theme: Option<String>,
    #[serde(default)]
    pub sidebar_collapsed: bool,
}

impl Default for ClientPreferences {
    fn default() -> Self {
        Self {
            schema_version: PREFERENCES_SCHEMA_VERSION,
            theme: ThemeMode::default(),
            color_theme: None,
            sidebar_collapsed: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClientPreferencesStore {
    path: Option<PathBuf>,
    preferences: ClientPreferences,
}

impl ClientPreferencesStore {
    /// Store that never touches disk.
    pub fn in_memory(preferences: ClientPreferences) -> Self {
        Self {
            path: None,
            preferences,
        }
    }

    /// Loads preferences from `path`. A corrupt or foreign file is reported and replaced by defaults.
    pub fn load(path: PathBuf) -> Result<Self> {
        let preferences = if path.exists() {
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read preferences file {}", path.display()))?;
            match serde_json::from_str::<ClientPreferences>(&raw) {
                Ok(preferences) if preferences.schema_version == PREFERENCES_SCHEMA_VERSION => {
                    preferences
                }
                Ok(preferences) => {
                    tracing::warn!(
                        path = %path.display(),
                        expected = PREFERENCES_SCHEMA_VERSION,
                        found = preferences.schema_version,
                        "unsupported preferences schema (starting fresh)"
                    );
                    ClientPreferences::default()
                }
                Err(error) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %error,
                        "failed to parse preferences file (starting fresh)"
                    );
                    ClientPreferences::default()
                }
            }
        } else {
            ClientPreferences::default()
        };
        Ok(Self {
            path: Some(path),
            preferences,
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn preferences(&self) -> &ClientPreferences {
        &self.preferences
    }

    pub fn toggle_theme(&mut self) -> Result<ThemeMode> {
        let theme = self.preferences.theme.toggled();
        self.commit(ClientPreferences {
            theme,
            ..self.preferences.clone()
        })?;
        Ok(theme)
    }

    pub fn set_color_theme(&mut self, color_theme: Option<String>) -> Result<()> {
        self.commit(ClientPreferences {
            color_theme: color_theme.filter(|name| !name.trim().is_empty()),
            ..self.preferences.clone()
        })
    }

    pub fn toggle_sidebar(&mut self) -> Result<bool> {
        let sidebar_collapsed = !self.preferences.sidebar_collapsed;
        self.commit(ClientPreferences {
            sidebar_collapsed,
            ..self.preferences.clone()
        })?;
        Ok(sidebar_collapsed)
    }

    /// Replaces the in-memory value only once the file write succeeded.
    fn commit(&mut self, next: ClientPreferences) -> Result<()> {
        if let Some(path) = self.path.as_deref() {
            write_json_pretty_atomic(path, &next)
                .with_context(|| format!("failed to write preferences file {}", path.display()))?;
        }
        self.preferences = next;
        Ok(())
    }
}

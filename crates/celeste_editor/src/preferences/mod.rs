//! Editor preferences and persistent settings
//!
//! Stored as JSON in the platform config directory:
//! - Windows: %APPDATA%/celeste_editor/
//! - Linux: ~/.config/celeste_editor/
//! - macOS: ~/Library/Application Support/celeste_editor/

use bevy::prelude::Resource;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const PREFERENCES_FILE: &str = "preferences.json";

#[derive(Debug, thiserror::Error)]
pub enum PreferencesError {
    #[error("No config directory available on this platform")]
    NoConfigDir,
    #[error("Failed to write preferences: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to encode preferences: {0}")]
    Json(#[from] serde_json::Error),
}

/// Editor preferences that persist across sessions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Resource)]
#[serde(default)]
pub struct EditorPreferences {
    /// Version for future migrations
    pub version: u32,

    pub window_width: Option<f32>,
    pub window_height: Option<f32>,
    pub window_x: Option<i32>,
    pub window_y: Option<i32>,

    /// TSX opened last, used when no path is passed on the command line
    pub last_tsx: Option<PathBuf>,
}

impl Default for EditorPreferences {
    fn default() -> Self {
        Self {
            version: 1,
            window_width: None,
            window_height: None,
            window_x: None,
            window_y: None,
            last_tsx: None,
        }
    }
}

impl EditorPreferences {
    /// Path of the preferences file, if the platform has a config dir
    pub fn file_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "celeste_editor")
            .map(|dirs| dirs.config_dir().join(PREFERENCES_FILE))
    }

    /// Load preferences, falling back to defaults when missing or unreadable
    pub fn load() -> Self {
        Self::file_path()
            .map(|path| Self::load_from(&path))
            .unwrap_or_default()
    }

    pub fn load_from(path: &Path) -> Self {
        let Ok(content) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        match serde_json::from_str(&content) {
            Ok(preferences) => preferences,
            Err(e) => {
                bevy::log::warn!("Ignoring unreadable preferences {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn save(&self) -> Result<(), PreferencesError> {
        let path = Self::file_path().ok_or(PreferencesError::NoConfigDir)?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), PreferencesError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Remember a TSX path; returns `true` when it changed
    pub fn remember_tsx(&mut self, path: &Path) -> bool {
        if self.last_tsx.as_deref() == Some(path) {
            return false;
        }
        self.last_tsx = Some(path.to_path_buf());
        true
    }
}

//! Persistent dashboard settings
//!
//! Settings are read once at startup into a single owned [`Settings`] value
//! and written back through [`SettingsStore::save`] on every change. The file
//! lives in the platform config directory (`~/.config/skyglance/settings.json`
//! on Linux).

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::client::DEFAULT_PROXY_URL;
use crate::data::DEFAULT_WINDOW_SIZE;

const SETTINGS_FILE: &str = "settings.json";

/// Colour scheme preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

/// Contrast preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Contrast {
    #[default]
    Normal,
    High,
}

impl Contrast {
    pub fn toggled(self) -> Self {
        match self {
            Self::Normal => Self::High,
            Self::High => Self::Normal,
        }
    }
}

/// User preferences that survive restarts
///
/// Missing keys take their default, so older files keep loading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub theme: Theme,
    pub contrast: Contrast,
    /// Number of upcoming hours to show
    pub window_size: usize,
    /// Base URL of the forecast proxy
    pub proxy_url: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            contrast: Contrast::default(),
            window_size: DEFAULT_WINDOW_SIZE,
            proxy_url: DEFAULT_PROXY_URL.to_string(),
        }
    }
}

/// Errors that can occur when saving settings
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to write settings: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to serialize settings: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Reads and writes [`Settings`] on disk
#[derive(Debug, Clone)]
pub struct SettingsStore {
    /// `None` keeps settings in memory only
    path: Option<PathBuf>,
}

impl Default for SettingsStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsStore {
    /// Uses the platform config directory, or memory only when there is none
    pub fn new() -> Self {
        let path = ProjectDirs::from("", "", "skyglance")
            .map(|dirs| dirs.config_dir().join(SETTINGS_FILE));
        Self { path }
    }

    /// Uses a specific settings file
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    /// Never touches the filesystem
    pub fn in_memory() -> Self {
        Self { path: None }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Loads settings, falling back to defaults
    ///
    /// A missing file is normal on first run. An unreadable or invalid file
    /// is logged and replaced by defaults on the next save.
    pub fn load(&self) -> Settings {
        let Some(path) = &self.path else {
            return Settings::default();
        };

        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no settings file, using defaults");
                return Settings::default();
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "failed to read settings");
                return Settings::default();
            }
        };

        match serde_json::from_str::<Settings>(&content) {
            Ok(mut settings) => {
                if settings.window_size == 0 {
                    warn!("window_size of 0 in settings, using default");
                    settings.window_size = DEFAULT_WINDOW_SIZE;
                }
                settings
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "invalid settings file, using defaults");
                Settings::default()
            }
        }
    }

    /// Writes settings, creating the directory if needed
    pub fn save(&self, settings: &Settings) -> Result<(), SettingsError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(settings)?;
        fs::write(path, json)?;
        debug!(path = %path.display(), "settings saved");
        Ok(())
    }
}

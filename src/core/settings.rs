//! Persisted user settings
//!
//! Stored as JSON at `<config dir>/audiobook-binder/settings.json`. Command
//! line flags override whatever is loaded here.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::bitrate::Bitrate;
use crate::audio::DEFAULT_EXTENSIONS;

/// Application-wide settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppSettings {
    /// Bitrate used when none is given on the command line
    #[serde(default)]
    pub default_bitrate: Bitrate,
    /// Author written when none is given
    #[serde(default = "default_author")]
    pub default_author: String,
    /// Explicit ffmpeg location (otherwise searched on PATH)
    #[serde(default)]
    pub ffmpeg_path: Option<PathBuf>,
    /// Explicit ffprobe location (otherwise searched on PATH)
    #[serde(default)]
    pub ffprobe_path: Option<PathBuf>,
    /// File extensions treated as input tracks
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
    /// Read durations in-process instead of running ffprobe
    #[serde(default)]
    pub native_probe: bool,
}

fn default_author() -> String {
    "Unknown".to_string()
}

fn default_extensions() -> Vec<String> {
    DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect()
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            default_bitrate: Bitrate::default(),
            default_author: default_author(),
            ffmpeg_path: None,
            ffprobe_path: None,
            extensions: default_extensions(),
            native_probe: false,
        }
    }
}

impl AppSettings {
    const SETTINGS_FILE: &'static str = "settings.json";

    /// Standard settings file location
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("audiobook-binder").join(Self::SETTINGS_FILE))
    }

    /// Load settings from the standard location, or defaults if absent
    pub fn load() -> Self {
        match Self::default_path() {
            Some(path) => Self::load_from(&path),
            None => {
                log::debug!("No config directory on this platform; using default settings");
                Self::default()
            }
        }
    }

    /// Load settings from `path`, falling back to defaults on any error
    pub fn load_from(path: &Path) -> Self {
        match Self::try_load(path) {
            Ok(settings) => {
                log::debug!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                log::debug!("Using default settings: {}", e);
                Self::default()
            }
        }
    }

    fn try_load(path: &Path) -> Result<Self, String> {
        if !path.exists() {
            return Err("Settings file not found".to_string());
        }

        let contents = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read settings: {}", e))?;

        serde_json::from_str(&contents).map_err(|e| format!("Failed to parse settings: {}", e))
    }

    /// Save settings to the standard location
    pub fn save(&self) -> Result<PathBuf, String> {
        let path = Self::default_path()
            .ok_or_else(|| "Could not determine config directory".to_string())?;
        self.save_to(&path)?;
        Ok(path)
    }

    /// Save settings to `path`, creating parent folders as needed
    pub fn save_to(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create settings directory: {}", e))?;
        }

        let json = serde_json::to_string_pretty(self)
            .map_err(|e| format!("Failed to serialize settings: {}", e))?;

        std::fs::write(path, json).map_err(|e| format!("Failed to write settings: {}", e))?;

        log::debug!("Saved settings to {}", path.display());
        Ok(())
    }
}

// SPDX-License-Identifier: MIT OR Apache-2.0
//! Viewer settings.
//!
//! Settings are stored as RON. Every field has a default, so a settings file
//! only needs to list what it changes.

use serde::{Deserialize, Serialize};
use station_map_graph::MapStyle;
use std::path::{Path, PathBuf};

/// Current settings format version
pub const SETTINGS_FORMAT_VERSION: u32 = 1;

/// Settings file name looked up in the working directory
pub const SETTINGS_FILE_NAME: &str = "station_map.ron";

/// Environment variable overriding the settings file location
pub const SETTINGS_PATH_ENV: &str = "STATION_MAP_SETTINGS";

/// Window settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowSettings {
    /// Window title
    pub title: String,
    /// Initial inner size (logical pixels)
    pub size: [u32; 2],
    /// Minimum inner size (logical pixels)
    pub min_size: [u32; 2],
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            title: "Station Map".to_string(),
            size: [1280, 900],
            min_size: [640, 480],
        }
    }
}

/// Viewer settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerSettings {
    /// Settings format version
    pub version: u32,
    /// Window settings
    pub window: WindowSettings,
    /// RON map file to load instead of the built-in station map
    pub map_path: Option<PathBuf>,
    /// Annotate edges with their weight
    pub show_weights: bool,
    /// Draw the background grid
    pub show_grid: bool,
    /// Map colours and sizes
    pub style: MapStyle,
}

impl Default for ViewerSettings {
    fn default() -> Self {
        Self {
            version: SETTINGS_FORMAT_VERSION,
            window: WindowSettings::default(),
            map_path: None,
            show_weights: true,
            show_grid: false,
            style: MapStyle::default(),
        }
    }
}

impl ViewerSettings {
    /// Path of the settings file: `$STATION_MAP_SETTINGS` or `./station_map.ron`
    pub fn default_path() -> PathBuf {
        std::env::var_os(SETTINGS_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(SETTINGS_FILE_NAME))
    }

    /// Load settings from a file
    pub fn load(path: &Path) -> std::io::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut settings: ViewerSettings = ron::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;

        // Version check
        if settings.version > SETTINGS_FORMAT_VERSION {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!(
                    "Settings version {} is newer than supported version {}",
                    settings.version, SETTINGS_FORMAT_VERSION
                ),
            ));
        }

        // Relative map paths are relative to the settings file
        if let Some(dir) = path.parent() {
            settings.map_path = settings
                .map_path
                .take()
                .map(|map_path| if map_path.is_relative() { dir.join(map_path) } else { map_path });
        }

        Ok(settings)
    }

    /// Load settings, falling back to defaults when the file is missing or invalid
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(settings) => {
                tracing::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No settings file at {}, using defaults", path.display());
                Self::default()
            }
            Err(e) => {
                tracing::warn!("Ignoring settings file {}: {e}", path.display());
                Self::default()
            }
        }
    }

    /// Save settings to a file
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        let config = ron::ser::PrettyConfig::default()
            .struct_names(true)
            .enumerate_arrays(false);

        let content = ron::ser::to_string_pretty(self, config).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;

        std::fs::write(path, content)
    }
}

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::BuilderError;

pub const DEFAULT_CONFIG_NAME: &str = "wb.config.json";

/// Builder configuration file format
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuilderConfig {
    #[serde(default)]
    pub settings: BuilderSettings,

    #[serde(default)]
    pub canvas: CanvasState,

    #[serde(default)]
    pub ui: UiState,
}

impl BuilderConfig {
    /// Load config from a directory. A missing file yields the defaults.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self, BuilderError> {
        let config_path = dir.as_ref().join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            Self::from_json(&content)
                .map_err(|err| BuilderError::Config(format!("{}: {}", config_path.display(), err)))
        } else {
            Ok(Self::default())
        }
    }

    pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BuilderSettings {
    pub auto_save: bool,

    /// Milliseconds between auto-save writes
    pub auto_save_interval_ms: u64,

    /// Maximum number of history entries kept
    pub undo_limit: usize,

    pub default_component_library: String,

    pub keyboard_shortcuts: bool,
}

impl BuilderSettings {
    pub fn auto_save_interval(&self) -> Duration {
        Duration::from_millis(self.auto_save_interval_ms.max(1))
    }
}

impl Default for BuilderSettings {
    fn default() -> Self {
        Self {
            auto_save: true,
            auto_save_interval_ms: 30_000,
            undo_limit: 50,
            default_component_library: "default".to_string(),
            keyboard_shortcuts: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Canvas view state. Not structural, but captured by history snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CanvasState {
    pub zoom: f64,
    pub pan: Point,
    pub grid_enabled: bool,
    pub snap_to_grid: bool,
    pub grid_size: u32,
    pub background_color: String,
    pub dimensions: Dimensions,
}

impl Default for CanvasState {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            pan: Point::default(),
            grid_enabled: true,
            snap_to_grid: false,
            grid_size: 10,
            background_color: "#ffffff".to_string(),
            dimensions: Dimensions {
                width: 1200,
                height: 800,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UiState {
    pub sidebar_collapsed: bool,
    pub property_panel_collapsed: bool,
    pub theme: Theme,
    pub active_tab: String,
    pub modal_stack: Vec<String>,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            sidebar_collapsed: false,
            property_panel_collapsed: false,
            theme: Theme::Light,
            active_tab: "components".to_string(),
            modal_stack: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let json = r##"{
            "settings": { "autoSaveIntervalMs": 5000, "undoLimit": 20 },
            "canvas": { "zoom": 2.0, "backgroundColor": "#000000" },
            "ui": { "theme": "dark" }
        }"##;

        let config = BuilderConfig::from_json(json).unwrap();
        assert_eq!(config.settings.auto_save_interval(), Duration::from_secs(5));
        assert_eq!(config.settings.undo_limit, 20);
        assert!(config.settings.auto_save);
        assert_eq!(config.canvas.zoom, 2.0);
        assert_eq!(config.canvas.grid_size, 10);
        assert_eq!(config.ui.theme, Theme::Dark);
        assert_eq!(config.ui.active_tab, "components");
    }

    #[test]
    fn test_default_config() {
        let config = BuilderConfig::default();
        assert_eq!(config.settings.undo_limit, 50);
        assert_eq!(config.settings.auto_save_interval_ms, 30_000);
        assert_eq!(config.canvas.dimensions.width, 1200);
        assert_eq!(config.ui.theme, Theme::Light);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(BuilderConfig::load(dir.path()).unwrap(), BuilderConfig::default());
    }

    #[test]
    fn test_load_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(DEFAULT_CONFIG_NAME), "{ not json").unwrap();

        assert!(matches!(
            BuilderConfig::load(dir.path()),
            Err(BuilderError::Config(_))
        ));
    }
}

// SPDX-License-Identifier: MIT OR Apache-2.0
//! Editor configuration, stored as RON.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Current configuration format version
pub const CONFIG_FORMAT_VERSION: u32 = 1;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File could not be read or written
    #[error("Config file error: {0}")]
    Io(#[from] std::io::Error),

    /// File is not valid RON
    #[error("Config parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// Config could not be serialized
    #[error("Config serialization error: {0}")]
    Serialize(#[from] ron::Error),

    /// File was written by a newer editor
    #[error("Config version {found} is newer than supported version {supported}")]
    UnsupportedVersion {
        /// Version found in the file
        found: u32,
        /// Newest version this build understands
        supported: u32,
    },
}

/// Transform gizmo appearance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GizmoConfig {
    /// Display scale at rest
    pub base_size: f32,
    /// Scale multiplier while hovered or dragged
    pub hover_scale: f32,
    /// Exponential smoothing rate (per second)
    pub smoothing_rate: f32,
}

impl Default for GizmoConfig {
    fn default() -> Self {
        Self {
            base_size: 1.0,
            hover_scale: 1.2,
            smoothing_rate: 12.0,
        }
    }
}

/// Orbit camera behaviour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Orbit speed (radians per pixel)
    pub rotate_speed: f32,
    /// Pan speed (fraction of distance per pixel)
    pub pan_speed: f32,
    /// Zoom speed
    pub zoom_speed: f32,
    /// Offset along each axis when focusing on a node
    pub focus_distance: f32,
    /// Duration of focus and return animations in milliseconds
    pub focus_duration_ms: u64,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            rotate_speed: 0.01,
            pan_speed: 0.001,
            zoom_speed: 1.0,
            focus_distance: 3.0,
            focus_duration_ms: 2000,
        }
    }
}

impl CameraConfig {
    /// Focus animation duration in seconds
    pub fn focus_duration_secs(&self) -> f32 {
        Duration::from_millis(self.focus_duration_ms).as_secs_f32()
    }
}

/// Complete editor configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Format version
    pub version: u32,
    /// Maximum number of history entries kept
    pub history_limit: usize,
    /// Quiet period for the hierarchy search box
    pub filter_debounce_ms: u64,
    /// Gizmo settings
    pub gizmo: GizmoConfig,
    /// Camera settings
    pub camera: CameraConfig,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_FORMAT_VERSION,
            history_limit: 10,
            filter_debounce_ms: 300,
            gizmo: GizmoConfig::default(),
            camera: CameraConfig::default(),
        }
    }
}

impl EditorConfig {
    /// Parse configuration from RON
    pub fn from_ron(source: &str) -> Result<Self, ConfigError> {
        let config: EditorConfig = ron::from_str(source)?;
        if config.version > CONFIG_FORMAT_VERSION {
            return Err(ConfigError::UnsupportedVersion {
                found: config.version,
                supported: CONFIG_FORMAT_VERSION,
            });
        }
        Ok(config)
    }

    /// Serialize to pretty RON
    pub fn to_ron(&self) -> Result<String, ConfigError> {
        let pretty = ron::ser::PrettyConfig::default()
            .struct_names(true)
            .enumerate_arrays(false);
        Ok(ron::ser::to_string_pretty(self, pretty)?)
    }

    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_ron(&content)?;
        tracing::info!("Loaded editor config from {:?}", path);
        Ok(config)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        std::fs::write(path, self.to_ron()?)?;
        Ok(())
    }

    /// Search box debounce as a duration
    pub fn filter_debounce(&self) -> Duration {
        Duration::from_millis(self.filter_debounce_ms)
    }
}

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::playback::DEFAULT_DURATION;
use crate::core::timer::FixedHz;

/// Playback ticks per second
pub const PLAYBACK_HZ: f32 = 30.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    pub hz: f32,
    pub duration: u32,
    /// Most playback ticks replayed after a stalled frame
    pub max_catch_up: u32,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            hz: PLAYBACK_HZ,
            duration: DEFAULT_DURATION,
            max_catch_up: FixedHz::DEFAULT_MAX_CATCH_UP,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub position: [f32; 3],
    pub target: [f32; 3],
    /// Vertical field of view in degrees
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: [6.0, 6.0, 8.0],
            target: [0.0, 0.0, 0.0],
            fov_degrees: 50.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

/// Everything tunable about the viewer; every field has a default so a
/// config file only lists what it overrides
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub playback: PlaybackConfig,
    pub window: WindowConfig,
    pub camera: CameraConfig,
}

impl ViewerConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_viewer() {
        let config = ViewerConfig::default();
        assert_eq!(config.playback.hz, 30.0);
        assert_eq!(config.playback.duration, 240);
        assert_eq!(config.camera.position, [6.0, 6.0, 8.0]);
        assert_eq!(config.camera.fov_degrees, 50.0);
    }

    #[test]
    fn test_partial_override() {
        let config: ViewerConfig =
            serde_json::from_str(r#"{"playback": {"duration": 90}, "window": {"width": 640}}"#).unwrap();
        assert_eq!(config.playback.duration, 90);
        assert_eq!(config.playback.hz, 30.0);
        assert_eq!(config.window.width, 640);
        assert_eq!(config.window.height, 720);
    }

    #[test]
    fn test_load_missing_file_has_context() {
        let err = ViewerConfig::load("/definitely/not/here.json").unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}

//! # Engine configuration
//!
//! One serde tree covering logging, the window the host should open, camera
//! defaults and asset paths. Loaded through [`Config`] from TOML or RON.

use serde::{Deserialize, Serialize};

pub use crate::config::{Config, ConfigError};

/// Window the host opens (or pretends to, when headless)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Window title
    pub title: String,
    /// Initial width in pixels
    pub width: u32,
    /// Initial height in pixels
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Scene Viewer".to_string(),
            width: 1280,
            height: 720,
        }
    }
}

/// Projection defaults for newly created cameras
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view in degrees
    pub fov_y_degrees: f32,
    /// Near clip plane distance
    pub near: f32,
    /// Far clip plane distance
    pub far: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_y_degrees: 60.0,
            near: 0.1,
            far: 10_000.0,
        }
    }
}

/// Asset locations
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
    /// Scene loaded at startup, if any
    pub scene_path: Option<String>,
    /// Image bound as albedo for primitives without a base-color texture
    pub fallback_albedo: Option<String>,
}

impl AssetConfig {
    /// Set the startup scene
    pub fn with_scene(mut self, path: impl Into<String>) -> Self {
        self.scene_path = Some(path.into());
        self
    }
}

/// Top-level engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Log level name (`error`, `warn`, `info`, `debug`, `trace`)
    pub log_level: String,
    /// Window settings
    pub window: WindowConfig,
    /// Camera defaults
    pub camera: CameraConfig,
    /// Asset settings
    pub assets: AssetConfig,
    /// Stop after this many frames; `None` runs until the host closes
    pub frame_limit: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            window: WindowConfig::default(),
            camera: CameraConfig::default(),
            assets: AssetConfig::default(),
            frame_limit: None,
        }
    }
}

impl EngineConfig {
    /// Set log level
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Stop after `frames` frames
    pub fn with_frame_limit(mut self, frames: u64) -> Self {
        self.frame_limit = Some(frames);
        self
    }

    /// Check values that would make the engine misbehave
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window.width == 0 || self.window.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "window size {}x{} must be non-zero",
                self.window.width, self.window.height
            )));
        }

        let camera = &self.camera;
        if !(camera.fov_y_degrees > 0.0 && camera.fov_y_degrees < 180.0) {
            return Err(ConfigError::Invalid(format!(
                "field of view {} must be between 0 and 180 degrees",
                camera.fov_y_degrees
            )));
        }
        if !(camera.near > 0.0 && camera.far > camera.near) {
            return Err(ConfigError::Invalid(format!(
                "clip planes near={} far={} must satisfy 0 < near < far",
                camera.near, camera.far
            )));
        }

        Ok(())
    }
}

impl Config for EngineConfig {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigFormat;

    #[test]
    fn test_defaults_are_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.camera.fov_y_degrees, 60.0);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let toml = r#"
            log_level = "debug"
            frame_limit = 3

            [window]
            width = 640
        "#;
        let config = EngineConfig::from_str_with(toml, ConfigFormat::Toml).unwrap();
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.frame_limit, Some(3));
        assert_eq!(config.window.width, 640);
        assert_eq!(config.window.height, 720);
        assert_eq!(config.camera, CameraConfig::default());
    }

    #[test]
    fn test_ron_roundtrip() {
        let config = EngineConfig::default()
            .with_log_level("trace")
            .with_frame_limit(10);
        let text = config.to_string_with(ConfigFormat::Ron).unwrap();
        let parsed = EngineConfig::from_str_with(&text, ConfigFormat::Ron).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_invalid_clip_planes() {
        let mut config = EngineConfig::default();
        config.camera.near = 10.0;
        config.camera.far = 1.0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_unknown_extension() {
        let err = EngineConfig::load_from_file("engine.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config = EngineConfig::load_or_default("does/not/exist.toml").unwrap();
        assert_eq!(config, EngineConfig::default());
    }
}

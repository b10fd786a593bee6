//! Engine-wide configuration

pub mod config;

pub use config::{AssetConfig, CameraConfig, EngineConfig, WindowConfig};
pub use crate::config::{Config, ConfigError};

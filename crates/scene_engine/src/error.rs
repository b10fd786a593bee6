//! Top-level engine error

use crate::assets::AssetError;
use crate::config::ConfigError;
use crate::ecs::EcsError;
use crate::foundation::math::MathError;
use crate::render::RenderError;
use thiserror::Error;

/// Any error surfaced by the engine loop or its subsystems
#[derive(Error, Debug)]
pub enum EngineError {
    /// Invalid or unreadable configuration
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Entity or component operation failed
    #[error("ECS error: {0}")]
    Ecs(#[from] EcsError),

    /// Rendering failed
    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    /// Scene content could not be loaded
    #[error("Asset load failed: {0}")]
    Asset(#[from] AssetError),

    /// Math operation outside its domain
    #[error("Math error: {0}")]
    Math(#[from] MathError),

    /// The application reported an error
    #[error("Application error: {0}")]
    ApplicationError(String),
}

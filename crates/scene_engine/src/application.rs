//! Application trait and lifecycle management

use crate::engine::Engine;
use crate::error::EngineError;
use crate::scene::Viewport;
use thiserror::Error;

/// Application lifecycle trait
///
/// Implement this to drive the engine. The engine calls
/// [`initialize`](Self::initialize) once, then every frame
/// [`handle_event`](Self::handle_event) for each host event followed by
/// [`update`](Self::update), and [`cleanup`](Self::cleanup) before it shuts
/// down.
pub trait Application {
    /// Called once before the first frame
    fn initialize(&mut self, engine: &mut Engine) -> Result<(), AppError>;

    /// Called every frame before the active scene updates
    ///
    /// # Arguments
    /// * `engine` - The running engine
    /// * `delta_time` - Time since last frame in seconds
    fn update(&mut self, engine: &mut Engine, delta_time: f32) -> Result<(), AppError>;

    /// Handle one host event; the default forwards it to the engine
    fn handle_event(&mut self, engine: &mut Engine, event: AppEvent) -> Result<(), AppError> {
        engine.handle_event(event);
        Ok(())
    }

    /// Called once after the last frame
    fn cleanup(&mut self, _engine: &mut Engine) {}
}

/// Application-level errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Engine error propagated to application level
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    /// Custom application error
    #[error("Application error: {0}")]
    Custom(String),
}

/// Events a host forwards to the application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEvent {
    /// The drawable area changed size
    Resized(Viewport),

    /// The user asked to close the window
    CloseRequested,
}

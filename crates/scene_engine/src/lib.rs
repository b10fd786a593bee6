//! # Scene Engine
//!
//! The core of a small real-time 3D engine: a math kernel, an
//! entity-component store with a parent/child scene graph, lazily recomputed
//! transforms, a per-frame scene traversal and a glTF 2.0 importer.
//!
//! GPU work goes through the [`RenderBackend`](render::RenderBackend) trait;
//! [`RecordingBackend`](render::RecordingBackend) runs everything headless.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use scene_engine::prelude::*;
//!
//! struct Viewer;
//!
//! impl Application for Viewer {
//!     fn initialize(&mut self, engine: &mut Engine) -> Result<(), AppError> {
//!         engine.load_scene("assets/scene.gltf")?;
//!         if let Some(scene) = engine.scene_mut() {
//!             let mut camera = scene.create_game_object();
//!             camera.add_component(Camera::default()).map_err(EngineError::from)?;
//!         }
//!         Ok(())
//!     }
//!
//!     fn update(&mut self, _engine: &mut Engine, _delta_time: f32) -> Result<(), AppError> {
//!         Ok(())
//!     }
//! }
//!
//! struct Headless;
//!
//! impl Host for Headless {
//!     fn poll_events(&mut self) -> Vec<AppEvent> {
//!         Vec::new()
//!     }
//!
//!     fn viewport(&self) -> Viewport {
//!         Viewport::new(1280, 720)
//!     }
//! }
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = EngineConfig::default().with_frame_limit(60);
//!     let mut engine = Engine::new(config, Box::new(RecordingBackend::new()))?;
//!     engine.run(&mut Viewer, &mut Headless)?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]

pub mod core;
pub mod config;
pub mod foundation;
pub mod ecs;
pub mod render;
pub mod scene;
pub mod assets;

mod application;
mod engine;
mod error;

pub use application::{AppError, AppEvent, Application};
pub use engine::{Engine, Host};
pub use error::EngineError;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        AppError, AppEvent, Application, Engine, EngineError, Host,
        assets::{load_scene, AssetError, LoadedScene, LoaderOptions},
        core::{Config, EngineConfig},
        ecs::{
            components::{Camera, MeshRenderer, Relationship, Transform},
            hierarchy, Component, EcsError, Entity, GameObject, GameObjectRef, World,
        },
        foundation::{
            math::{Mat4, Quaternion, Vec2, Vec3, Vec4},
            time::Timer,
        },
        render::{RecordingBackend, RenderBackend, Renderer},
        scene::{FrameContext, Scene, Updatable, Viewport},
    };
}

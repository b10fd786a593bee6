//! Core engine implementation
//!
//! The [`Engine`] owns the renderer, the active [`Scene`] and the frame timer,
//! and replaces every process-wide singleton: anything that needs one of them
//! receives the engine by reference.

use crate::application::{AppEvent, Application};
use crate::assets::{self, LoadedScene, LoaderOptions};
use crate::core::EngineConfig;
use crate::error::EngineError;
use crate::foundation::time::Timer;
use crate::render::{RenderBackend, Renderer};
use crate::scene::{FrameContext, Scene, Viewport};
use std::path::Path;
use std::time::Duration;

/// The platform side of the main loop: events, window size, presentation
pub trait Host {
    /// Events received since the last call
    fn poll_events(&mut self) -> Vec<AppEvent>;

    /// Current drawable size
    fn viewport(&self) -> Viewport;

    /// Time the last frame took; `None` lets the engine read the wall clock
    fn frame_time(&mut self) -> Option<Duration> {
        None
    }

    /// Called after the renderer finished a frame
    fn present(&mut self) {}
}

/// Main engine struct
pub struct Engine {
    scene: Option<Scene>,
    renderer: Renderer,
    config: EngineConfig,
    timer: Timer,
    viewport: Viewport,
    frame_index: u64,
    running: bool,
}

impl Engine {
    /// Create an engine drawing through `backend`
    pub fn new(config: EngineConfig, backend: Box<dyn RenderBackend>) -> Result<Self, EngineError> {
        config.validate()?;
        log::info!(
            "Initializing engine ({}x{}, '{}')",
            config.window.width,
            config.window.height,
            config.window.title
        );

        Ok(Self {
            scene: None,
            renderer: Renderer::new(backend),
            viewport: Viewport::new(config.window.width, config.window.height),
            config,
            timer: Timer::new(),
            frame_index: 0,
            running: true,
        })
    }

    /// Run the main loop until the host closes, the application quits or the
    /// configured frame limit is reached
    pub fn run<A: Application, H: Host>(&mut self, app: &mut A, host: &mut H) -> Result<(), EngineError> {
        app.initialize(self)
            .map_err(|e| EngineError::ApplicationError(format!("App initialization: {}", e)))?;

        log::info!("Starting main loop...");
        let result = self.main_loop(app, host);

        app.cleanup(self);
        self.shutdown();
        log::info!("Engine shutdown complete after {} frames", self.frame_index);
        result
    }

    fn main_loop<A: Application, H: Host>(&mut self, app: &mut A, host: &mut H) -> Result<(), EngineError> {
        while self.running {
            for event in host.poll_events() {
                app.handle_event(self, event)
                    .map_err(|e| EngineError::ApplicationError(format!("App event: {}", e)))?;
            }
            if !self.running {
                break;
            }

            self.viewport = host.viewport();
            let delta_time = match host.frame_time() {
                Some(elapsed) => self.timer.advance(elapsed),
                None => self.timer.tick(),
            };

            app.update(self, delta_time)
                .map_err(|e| EngineError::ApplicationError(format!("App update: {}", e)))?;
            self.step(delta_time)?;
            host.present();

            if self.config.frame_limit.is_some_and(|limit| self.frame_index >= limit) {
                log::info!("Frame limit of {} reached", self.frame_index);
                self.running = false;
            }
        }
        Ok(())
    }

    /// Update and render the active scene once, then finish the frame
    pub fn step(&mut self, delta_time: f32) -> Result<(), EngineError> {
        let frame = FrameContext::new(delta_time, self.viewport, self.frame_index);
        if let Some(scene) = self.scene.as_mut() {
            scene.update(&frame);
            scene.render(&mut self.renderer)?;
        }
        self.renderer.end_frame();
        self.frame_index += 1;
        Ok(())
    }

    /// Apply a host event
    pub fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Resized(viewport) => {
                log::debug!("Viewport resized to {}x{}", viewport.width, viewport.height);
                self.viewport = viewport;
            }
            AppEvent::CloseRequested => self.quit(),
        }
    }

    /// Load a glTF file into a new scene and make it active
    ///
    /// The current scene stays active if loading fails.
    pub fn load_scene(&mut self, path: impl AsRef<Path>) -> Result<LoadedScene, EngineError> {
        let options = LoaderOptions::from_config(&self.config.assets);
        let mut scene = Scene::new();
        let loaded = assets::load_scene_with(&mut scene, path, &mut self.renderer, &options)?;
        self.set_active_scene(scene);
        Ok(loaded)
    }

    /// Replace the active scene
    ///
    /// The previous scene is dropped and its GPU resources released
    /// immediately.
    pub fn set_active_scene(&mut self, scene: Scene) {
        self.scene = Some(scene);
        self.renderer.release_pending();
    }

    /// Drop the active scene, if any
    pub fn clear_scene(&mut self) {
        self.scene = None;
        self.renderer.release_pending();
    }

    /// The active scene
    pub fn scene(&self) -> Option<&Scene> {
        self.scene.as_ref()
    }

    /// The active scene, mutably
    pub fn scene_mut(&mut self) -> Option<&mut Scene> {
        self.scene.as_mut()
    }

    /// Active scene together with the renderer, for loading into it
    pub fn scene_and_renderer(&mut self) -> Option<(&mut Scene, &mut Renderer)> {
        let renderer = &mut self.renderer;
        self.scene.as_mut().map(|scene| (scene, renderer))
    }

    /// The renderer
    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    /// The renderer, mutably
    pub fn renderer_mut(&mut self) -> &mut Renderer {
        &mut self.renderer
    }

    /// Engine configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Current drawable size
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Frames completed
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    /// Delta of the current frame in seconds
    pub fn delta_time(&self) -> f32 {
        self.timer.delta_time()
    }

    /// Seconds simulated since the first frame
    pub fn total_time(&self) -> f32 {
        self.timer.total_time()
    }

    /// Whether the main loop keeps going
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Request engine shutdown at the end of the current frame
    pub fn quit(&mut self) {
        log::info!("Engine shutdown requested");
        self.running = false;
    }

    /// Drop the scene and release every GPU resource
    pub fn shutdown(&mut self) {
        self.running = false;
        self.scene = None;
        self.renderer.shutdown();
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        self.shutdown();
    }
}

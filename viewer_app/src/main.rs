//! Headless scene viewer
//!
//! Loads a glTF scene, places a camera in front of it and steps the engine
//! against the recording backend, logging what would have been drawn.
//!
//! ```text
//! scene_viewer [SCENE.gltf] [--config viewer.toml] [--frames N]
//! ```

use scene_engine::foundation::logging;
use scene_engine::prelude::*;
use scene_engine::render::RecordingLog;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_CONFIG: &str = "viewer.toml";

#[derive(Error, Debug)]
enum ViewerError {
    #[error("missing value for {0}")]
    MissingValue(&'static str),

    #[error("invalid frame count '{0}'")]
    InvalidFrames(String),

    #[error("unknown argument '{0}'")]
    UnknownArgument(String),
}

#[derive(Debug, Default)]
struct Args {
    scene: Option<String>,
    config: Option<String>,
    frames: Option<u64>,
}

impl Args {
    fn parse(mut args: impl Iterator<Item = String>) -> Result<Self, ViewerError> {
        let mut parsed = Self::default();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" => {
                    parsed.config = Some(args.next().ok_or(ViewerError::MissingValue("--config"))?);
                }
                "--frames" => {
                    let value = args.next().ok_or(ViewerError::MissingValue("--frames"))?;
                    let frames = value.parse().map_err(|_| ViewerError::InvalidFrames(value.clone()))?;
                    parsed.frames = Some(frames);
                }
                flag if flag.starts_with("--") => return Err(ViewerError::UnknownArgument(arg)),
                _ => parsed.scene = Some(arg),
            }
        }
        Ok(parsed)
    }
}

/// Places a camera and reports what the scene contains
struct Viewer {
    camera_distance: f32,
}

impl Application for Viewer {
    fn initialize(&mut self, engine: &mut Engine) -> Result<(), AppError> {
        match engine.config().assets.scene_path.clone() {
            Some(path) => {
                let loaded = engine.load_scene(&path)?;
                log::info!("Loaded {} with {} entities", path, loaded.len());
            }
            None => {
                log::warn!("No scene given, showing an empty scene");
                engine.set_active_scene(Scene::new());
            }
        }

        let camera_config = engine.config().camera.clone();
        let scene = engine
            .scene_mut()
            .ok_or_else(|| AppError::Custom("no active scene".to_string()))?;

        let mut camera = scene.create_game_object();
        camera
            .add_component(Camera::from_config(&camera_config))
            .map_err(EngineError::from)?;
        camera
            .transform()
            .map_err(EngineError::from)?
            .set_position(Vec3::new(0.0, 0.0, self.camera_distance));

        for (component, count) in scene.world().component_summary() {
            log::info!("  {:>4} x {}", count, component);
        }
        Ok(())
    }

    fn update(&mut self, engine: &mut Engine, delta_time: f32) -> Result<(), AppError> {
        let frame = engine.frame_index();
        if frame % 60 == 0 {
            log::debug!("Frame {} (dt {:.4}s)", frame, delta_time);
        }
        Ok(())
    }

    fn cleanup(&mut self, engine: &mut Engine) {
        log::info!(
            "Viewer finished: {} frames, {:.2}s simulated",
            engine.frame_index(),
            engine.total_time()
        );
    }
}

/// Fixed-size, fixed-rate host with no window
struct HeadlessHost {
    viewport: Viewport,
    frame_time: Duration,
    log: RecordingLog,
}

impl Host for HeadlessHost {
    fn poll_events(&mut self) -> Vec<AppEvent> {
        Vec::new()
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn frame_time(&mut self) -> Option<Duration> {
        Some(self.frame_time)
    }

    fn present(&mut self) {
        log::trace!("Presented {} draws", self.log.last_frame_draws().len());
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse(std::env::args().skip(1))?;

    let config_path = args.config.as_deref().unwrap_or(DEFAULT_CONFIG);
    let mut config = EngineConfig::load_or_default(config_path)?;
    if let Some(scene) = args.scene {
        config.assets.scene_path = Some(scene);
    }
    if let Some(frames) = args.frames {
        config.frame_limit = Some(frames);
    }
    if config.frame_limit.is_none() {
        config.frame_limit = Some(1);
    }

    logging::init(logging::parse_level(&config.log_level));
    log::info!("Starting scene viewer");

    let backend = RecordingBackend::new();
    let log = backend.log();
    let mut host = HeadlessHost {
        viewport: Viewport::new(config.window.width, config.window.height),
        frame_time: Duration::from_secs_f32(1.0 / 60.0),
        log: log.clone(),
    };

    let mut engine = Engine::new(config, Box::new(backend))?;
    engine.run(&mut Viewer { camera_distance: 10.0 }, &mut host)?;

    log::info!(
        "Backend saw {} frames; last frame had {} draws; {} resources still alive",
        log.frame_count(),
        log.last_frame_draws().len(),
        log.live_resources()
    );
    Ok(())
}

//! Scene: one world plus the per-frame traversal over it

use crate::ecs::components::Camera;
use crate::ecs::{Component, Entity, GameObject, World};
use crate::render::{RenderResult, Renderer};
use super::FrameContext;
use std::any::TypeId;

/// Components with per-frame behaviour
pub trait Updatable {
    /// Called once per frame for every instance
    fn update(&mut self, owner: Entity, world: &mut World, frame: &FrameContext);
}

struct Updater {
    type_id: TypeId,
    type_name: &'static str,
    run: fn(&mut World, &FrameContext),
}

fn run_updatable<T: Component + Updatable>(world: &mut World, frame: &FrameContext) {
    world.storage_scope::<T, _>(|components, world| {
        for (owner, component) in components.iter_mut() {
            component.update(owner, world, frame);
        }
    });
}

/// Owns one [`World`] and drives update and render over it
///
/// Dropping a scene drops its components; GPU resources they own are queued
/// for release and destroyed by the renderer at the end of the next frame.
pub struct Scene {
    world: World,
    updaters: Vec<Updater>,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    /// Empty scene with cameras registered for update
    pub fn new() -> Self {
        let mut scene = Self {
            world: World::new(),
            updaters: Vec::new(),
        };
        scene.register_updatable::<Camera>();
        scene
    }

    /// Run `T::update` every frame, after previously registered types
    ///
    /// Registering a type twice has no effect.
    pub fn register_updatable<T: Component + Updatable>(&mut self) {
        let type_id = TypeId::of::<T>();
        if self.updaters.iter().any(|updater| updater.type_id == type_id) {
            return;
        }
        let type_name = std::any::type_name::<T>();
        log::debug!("Registered updatable component {}", type_name);
        self.updaters.push(Updater {
            type_id,
            type_name,
            run: run_updatable::<T>,
        });
    }

    /// Names of the updatable types in run order
    pub fn updatable_types(&self) -> Vec<&'static str> {
        self.updaters.iter().map(|updater| updater.type_name).collect()
    }

    /// The entity store
    pub fn world(&self) -> &World {
        &self.world
    }

    /// The entity store, mutably
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Create an entity with no components
    pub fn create_game_object(&mut self) -> GameObject<'_> {
        self.world.spawn()
    }

    /// Run every registered updatable once
    pub fn update(&mut self, frame: &FrameContext) {
        for updater in &self.updaters {
            (updater.run)(&mut self.world, frame);
        }
    }

    /// Let each camera draw the scene
    pub fn render(&self, renderer: &mut Renderer) -> RenderResult<()> {
        let mut cameras = 0;
        for (owner, camera) in self.world.view::<Camera>() {
            camera.render(owner, &self.world, renderer)?;
            cameras += 1;
        }
        if cameras == 0 {
            log::trace!("Scene has no camera, nothing rendered");
        }
        Ok(())
    }
}

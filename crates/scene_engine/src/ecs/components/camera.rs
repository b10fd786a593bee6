//! Camera component

use super::{MeshRenderer, Transform};
use crate::core::config::CameraConfig;
use crate::ecs::{Component, EcsError, Entity, World};
use crate::foundation::math::{utils::deg_to_rad, Mat4};
use crate::render::{RenderError, RenderResult, Renderer};
use crate::scene::{FrameContext, Updatable};

/// Perspective camera placed by its entity's [`Transform`]
///
/// At most one camera may exist per world. Adding a camera adds a
/// `Transform` to its entity when missing.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    /// Vertical field of view in degrees
    pub fov_y_degrees: f32,
    /// Near clip plane distance
    pub near: f32,
    /// Far clip plane distance
    pub far: f32,
    aspect: f32,
    owner: Option<Entity>,
}

impl Default for Camera {
    fn default() -> Self {
        Self::from_config(&CameraConfig::default())
    }
}

impl Component for Camera {
    const SINGLETON: bool = true;

    fn register_dependencies(world: &mut World, owner: Entity) -> Result<(), EcsError> {
        world.get_or_add_component::<Transform>(owner).map(|_| ())
    }

    fn on_attach(&mut self, owner: Entity) {
        log::debug!("Camera attached to {}", owner);
        self.owner = Some(owner);
    }
}

impl Updatable for Camera {
    fn update(&mut self, _owner: Entity, _world: &mut World, frame: &FrameContext) {
        self.aspect = frame.viewport.aspect_ratio();
    }
}

impl Camera {
    /// Camera with the given projection and a square aspect ratio
    pub fn new(fov_y_degrees: f32, near: f32, far: f32) -> Self {
        Self {
            fov_y_degrees,
            near,
            far,
            aspect: 1.0,
            owner: None,
        }
    }

    /// Camera using configured defaults
    pub fn from_config(config: &CameraConfig) -> Self {
        Self::new(config.fov_y_degrees, config.near, config.far)
    }

    /// Entity this camera is attached to
    pub fn owner(&self) -> Option<Entity> {
        self.owner
    }

    /// Width over height of the last viewport seen
    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    /// Perspective projection for the current aspect ratio
    pub fn projection_matrix(&self, homogeneous_depth: bool) -> Mat4 {
        Mat4::perspective(
            deg_to_rad(self.fov_y_degrees),
            self.aspect,
            self.near,
            self.far,
            homogeneous_depth,
        )
    }

    /// Set view and projection, then draw every mesh renderer in the world
    pub fn render(&self, owner: Entity, world: &World, renderer: &mut Renderer) -> RenderResult<()> {
        let transform = world
            .get_component::<Transform>(owner)
            .ok_or(RenderError::MissingTransform(owner))?;
        let view = transform.view_matrix(world)?;
        let projection = self.projection_matrix(renderer.homogeneous_depth());
        renderer.set_view_transform(&view, &projection);

        for (entity, mesh_renderer) in world.view::<MeshRenderer>() {
            mesh_renderer.render(entity, world, renderer)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Viewport;

    #[test]
    fn test_camera_requires_transform() {
        let mut world = World::new();
        let e = world.create_entity();
        world.add_component(e, Camera::default()).unwrap();
        assert!(world.has_component::<Transform>(e));
        assert_eq!(world.get_component::<Camera>(e).unwrap().owner(), Some(e));
    }

    #[test]
    fn test_second_camera_is_rejected() {
        let mut world = World::new();
        let first = world.create_entity();
        let second = world.create_entity();
        world.add_component(first, Camera::default()).unwrap();

        let err = world.add_component(second, Camera::default()).unwrap_err();
        assert!(matches!(err, EcsError::PolicyViolation(_)));
        assert!(world.has_component::<Camera>(first));
        assert!(!world.has_component::<Transform>(second));
    }

    #[test]
    fn test_update_tracks_viewport() {
        let mut world = World::new();
        let e = world.create_entity();
        let mut camera = Camera::default();
        let frame = FrameContext::new(0.016, Viewport::new(1600, 900), 0);
        camera.update(e, &mut world, &frame);
        approx::assert_relative_eq!(camera.aspect(), 16.0 / 9.0);
    }

    #[test]
    fn test_projection_uses_fov() {
        let camera = Camera::new(90.0, 0.1, 100.0);
        let projection = camera.projection_matrix(false);
        approx::assert_relative_eq!(projection.get(1, 1).unwrap(), 1.0, epsilon = 1e-6);
        assert_eq!(projection.get(3, 2).unwrap(), -1.0);
    }
}

//! Transform component
//!
//! Local position, scale and rotation, each change-tracked, with a lazily
//! recomputed local matrix. World-space queries walk the parent chain through
//! the [`World`].
//!
//! The local matrix is `T * R * S`: a point is scaled, then rotated, then
//! translated. A child's world matrix is `parent_world * child_local`.

use crate::ecs::{hierarchy, Component, Entity, World};
use crate::foundation::math::{Mat4, MathResult, Quaternion, Vec3};
use crate::foundation::tracked::Tracked;
use std::cell::Cell;

#[derive(Debug, Clone, Copy)]
struct LocalCache {
    generations: [u64; 3],
    matrix: Mat4,
}

/// Position, scale and rotation relative to the parent
#[derive(Debug, Clone)]
pub struct Transform {
    position: Tracked<Vec3>,
    scale: Tracked<Vec3>,
    rotation: Tracked<Quaternion>,
    owner: Option<Entity>,
    cache: Cell<Option<LocalCache>>,
}

impl Default for Transform {
    fn default() -> Self {
        Self::from_trs(Vec3::zeros(), Quaternion::IDENTITY, Vec3::splat(1.0))
    }
}

impl Component for Transform {
    fn on_attach(&mut self, owner: Entity) {
        self.owner = Some(owner);
    }
}

impl Transform {
    /// Identity transform
    pub fn new() -> Self {
        Self::default()
    }

    /// Transform from translation, rotation and scale
    pub fn from_trs(position: Vec3, rotation: Quaternion, scale: Vec3) -> Self {
        Self {
            position: Tracked::new(position),
            scale: Tracked::new(scale),
            rotation: Tracked::new(rotation),
            owner: None,
            cache: Cell::new(None),
        }
    }

    /// Builder: set position
    pub fn with_position(mut self, position: Vec3) -> Self {
        self.set_position(position);
        self
    }

    /// Builder: set rotation
    pub fn with_rotation(mut self, rotation: Quaternion) -> Self {
        self.set_rotation(rotation);
        self
    }

    /// Builder: set scale
    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.set_scale(scale);
        self
    }

    /// Entity this transform is attached to
    pub fn owner(&self) -> Option<Entity> {
        self.owner
    }

    /// Local position
    pub fn position(&self) -> Vec3 {
        *self.position.get()
    }

    /// Local scale
    pub fn scale(&self) -> Vec3 {
        *self.scale.get()
    }

    /// Local rotation
    pub fn rotation(&self) -> Quaternion {
        *self.rotation.get()
    }

    /// Set local position; marks it dirty only if the value changes
    pub fn set_position(&mut self, position: Vec3) {
        self.position.set(position);
    }

    /// Set local scale; marks it dirty only if the value changes
    pub fn set_scale(&mut self, scale: Vec3) {
        self.scale.set(scale);
    }

    /// Set local rotation; marks it dirty only if the value changes
    pub fn set_rotation(&mut self, rotation: Quaternion) {
        self.rotation.set(rotation);
    }

    /// Move by `delta` in parent space
    pub fn translate(&mut self, delta: Vec3) {
        self.position.update(|p| *p + delta);
    }

    fn generations(&self) -> [u64; 3] {
        [
            self.position.generation(),
            self.scale.generation(),
            self.rotation.generation(),
        ]
    }

    fn field_dirty(&self, field: usize) -> bool {
        match self.cache.get() {
            Some(cache) => cache.generations[field] != self.generations()[field],
            None => true,
        }
    }

    /// Position changed since the last matrix query
    pub fn is_position_dirty(&self) -> bool {
        self.field_dirty(0)
    }

    /// Scale changed since the last matrix query
    pub fn is_scale_dirty(&self) -> bool {
        self.field_dirty(1)
    }

    /// Rotation changed since the last matrix query
    pub fn is_rotation_dirty(&self) -> bool {
        self.field_dirty(2)
    }

    /// Any field changed since the last matrix query
    pub fn is_dirty(&self) -> bool {
        (0..3).any(|field| self.field_dirty(field))
    }

    /// Local `T * R * S` matrix
    ///
    /// Recomputed from all three fields when any of them is dirty, which
    /// clears every dirty flag at once. Otherwise the cached matrix is
    /// returned unchanged.
    pub fn local_matrix(&self) -> Mat4 {
        let generations = self.generations();
        if let Some(cache) = self.cache.get() {
            if cache.generations == generations {
                return cache.matrix;
            }
        }

        let mut matrix = Mat4::identity();
        matrix
            .translate(self.position())
            .rotate(self.rotation())
            .scale(self.scale());

        self.cache.set(Some(LocalCache { generations, matrix }));
        matrix
    }

    /// This transform followed by each ancestor's, stopping at the first
    /// ancestor without a `Transform`
    fn chain<'a>(&'a self, world: &'a World) -> impl Iterator<Item = &'a Transform> + 'a {
        let ancestors = self
            .owner
            .into_iter()
            .flat_map(move |owner| hierarchy::ancestors(world, owner))
            .map_while(move |ancestor| world.get_component::<Transform>(ancestor));
        std::iter::once(self).chain(ancestors)
    }

    /// Model-to-world matrix
    pub fn transform_matrix(&self, world: &World) -> Mat4 {
        self.chain(world)
            .fold(Mat4::identity(), |acc, transform| transform.local_matrix() * acc)
    }

    /// World-to-view matrix for an object used as a camera
    pub fn view_matrix(&self, world: &World) -> MathResult<Mat4> {
        self.transform_matrix(world).inverse()
    }

    /// Sum of the positions along the parent chain
    ///
    /// This ignores parent rotation and scale. Use
    /// [`transform_matrix`](Self::transform_matrix) for the exact placement.
    pub fn world_position(&self, world: &World) -> Vec3 {
        self.chain(world)
            .fold(Vec3::zeros(), |acc, transform| acc + transform.position())
    }

    /// Sum of the scales along the parent chain
    pub fn world_scale(&self, world: &World) -> Vec3 {
        self.chain(world)
            .fold(Vec3::zeros(), |acc, transform| acc + transform.scale())
    }

    /// Product of the rotations along the parent chain, root outermost
    pub fn world_rotation(&self, world: &World) -> Quaternion {
        self.chain(world)
            .fold(Quaternion::IDENTITY, |acc, transform| transform.rotation() * acc)
    }

    /// Rotate a local direction into world space
    pub fn orient_vec(&self, world: &World, direction: Vec3) -> Vec3 {
        self.world_rotation(world).rotate(direction)
    }

    /// World-space forward (local -Z)
    pub fn forward(&self, world: &World) -> Vec3 {
        self.orient_vec(world, Vec3::new(0.0, 0.0, -1.0))
    }

    /// World-space right (local +X)
    pub fn right(&self, world: &World) -> Vec3 {
        self.orient_vec(world, Vec3::new(1.0, 0.0, 0.0))
    }

    /// World-space up (local +Y)
    pub fn up(&self, world: &World) -> Vec3 {
        self.orient_vec(world, Vec3::new(0.0, 1.0, 0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::constants::HALF_PI;
    use approx::assert_relative_eq;

    const EPSILON: f32 = 1e-5;

    fn quarter_turn_y() -> Quaternion {
        Quaternion::from_axis_angle(Vec3::new(0.0, 1.0, 0.0), HALF_PI).unwrap()
    }

    #[test]
    fn test_new_transform_is_dirty_until_queried() {
        let transform = Transform::new();
        assert!(transform.is_dirty());
        assert_eq!(transform.local_matrix(), Mat4::identity());
        assert!(!transform.is_dirty());
    }

    #[test]
    fn test_setting_same_value_keeps_clean() {
        let mut transform = Transform::new().with_position(Vec3::new(1.0, 2.0, 3.0));
        transform.local_matrix();

        transform.set_position(Vec3::new(1.0, 2.0, 3.0));
        assert!(!transform.is_position_dirty());

        transform.set_scale(Vec3::new(2.0, 2.0, 2.0));
        assert!(transform.is_scale_dirty());
        assert!(!transform.is_rotation_dirty());
        assert!(transform.is_dirty());
    }

    #[test]
    fn test_query_clears_all_flags_and_caches() {
        let mut transform = Transform::new();
        transform.set_position(Vec3::new(4.0, 5.0, 6.0));
        transform.set_rotation(quarter_turn_y());
        assert!(transform.is_position_dirty());
        assert!(transform.is_rotation_dirty());

        let first = transform.local_matrix();
        assert!(!transform.is_dirty());
        let second = transform.local_matrix();
        assert_eq!(first.to_row_major_array(), second.to_row_major_array());
    }

    #[test]
    fn test_local_matrix_scales_rotates_translates() {
        let transform = Transform::from_trs(
            Vec3::new(10.0, 0.0, 0.0),
            quarter_turn_y(),
            Vec3::splat(2.0),
        );
        let p = transform.local_matrix().transform_point(Vec3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(p, Vec3::new(10.0, 0.0, -2.0), epsilon = EPSILON);
    }

    #[test]
    fn test_detached_transform_is_its_own_world() {
        let world = World::new();
        let transform = Transform::new().with_position(Vec3::new(1.0, 1.0, 1.0));
        assert_eq!(transform.transform_matrix(&world), transform.local_matrix());
        assert_eq!(transform.world_position(&world), Vec3::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn test_world_matrix_composes_parent() {
        let mut world = World::new();
        let parent = world.create_entity();
        let child = world.create_entity();
        world
            .add_component(parent, Transform::new().with_position(Vec3::new(0.0, 5.0, 0.0)).with_rotation(quarter_turn_y()))
            .unwrap();
        world
            .add_component(child, Transform::new().with_position(Vec3::new(1.0, 0.0, 0.0)))
            .unwrap();
        hierarchy::set_parent(&mut world, child, parent).unwrap();

        let transform = world.get_component::<Transform>(child).unwrap();
        let origin = transform.transform_matrix(&world).transform_point(Vec3::zeros());
        assert_relative_eq!(origin, Vec3::new(0.0, 5.0, -1.0), epsilon = EPSILON);

        // additive approximation ignores the parent's rotation
        assert_relative_eq!(transform.world_position(&world), Vec3::new(1.0, 5.0, 0.0));
        assert_relative_eq!(transform.world_scale(&world), Vec3::splat(2.0));
    }

    #[test]
    fn test_chain_stops_at_ancestor_without_transform() {
        let mut world = World::new();
        let grandparent = world.create_entity();
        let parent = world.create_entity();
        let child = world.create_entity();
        world
            .add_component(grandparent, Transform::new().with_position(Vec3::new(100.0, 0.0, 0.0)))
            .unwrap();
        world
            .add_component(child, Transform::new().with_position(Vec3::new(1.0, 0.0, 0.0)))
            .unwrap();
        hierarchy::set_parent(&mut world, parent, grandparent).unwrap();
        hierarchy::set_parent(&mut world, child, parent).unwrap();

        let transform = world.get_component::<Transform>(child).unwrap();
        assert_eq!(transform.world_position(&world), Vec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_view_matrix_inverts_world() {
        let transform = Transform::from_trs(
            Vec3::new(0.0, 2.0, 8.0),
            quarter_turn_y(),
            Vec3::splat(1.0),
        );
        let world = World::new();
        let view = transform.view_matrix(&world).unwrap();
        assert_relative_eq!(view * transform.transform_matrix(&world), Mat4::identity(), epsilon = EPSILON);
    }

    #[test]
    fn test_direction_helpers() {
        let world = World::new();
        let transform = Transform::new();
        assert_relative_eq!(transform.forward(&world), Vec3::new(0.0, 0.0, -1.0));
        assert_relative_eq!(transform.right(&world), Vec3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(transform.up(&world), Vec3::new(0.0, 1.0, 0.0));

        let turned = Transform::new().with_rotation(quarter_turn_y());
        assert_relative_eq!(turned.forward(&world), Vec3::new(-1.0, 0.0, 0.0), epsilon = EPSILON);
    }

    #[test]
    fn test_world_rotation_applies_parent_last() {
        let mut world = World::new();
        let parent = world.create_entity();
        let child = world.create_entity();
        let about_x = Quaternion::from_axis_angle(Vec3::new(1.0, 0.0, 0.0), HALF_PI).unwrap();
        world.add_component(parent, Transform::new().with_rotation(quarter_turn_y())).unwrap();
        world.add_component(child, Transform::new().with_rotation(about_x)).unwrap();
        hierarchy::set_parent(&mut world, child, parent).unwrap();

        let transform = world.get_component::<Transform>(child).unwrap();
        let v = Vec3::new(0.0, 0.0, 1.0);
        let expected = quarter_turn_y().rotate(about_x.rotate(v));
        assert_relative_eq!(transform.orient_vec(&world, v), expected, epsilon = EPSILON);
    }
}

//! Borrowed entity handle

use super::components::{Camera, Transform};
use super::{hierarchy, Component, EcsError, Entity, World};

/// An entity together with the world it lives in
///
/// Created by [`World::game_object`] or [`World::spawn`]. It owns nothing;
/// dropping it leaves the entity in place.
pub struct GameObject<'w> {
    world: &'w mut World,
    entity: Entity,
}

impl<'w> GameObject<'w> {
    pub(crate) fn new(world: &'w mut World, entity: Entity) -> Self {
        Self { world, entity }
    }

    /// Entity id
    pub fn id(&self) -> Entity {
        self.entity
    }

    /// Underlying world
    pub fn world(&mut self) -> &mut World {
        self.world
    }

    /// Attach a component, see [`World::add_component`]
    pub fn add_component<T: Component>(&mut self, component: T) -> Result<&mut T, EcsError> {
        self.world.add_component(self.entity, component)
    }

    /// Component of type `T`
    pub fn get_component<T: Component>(&self) -> Option<&T> {
        self.world.get_component(self.entity)
    }

    /// Component of type `T`, mutably
    pub fn get_component_mut<T: Component>(&mut self) -> Option<&mut T> {
        self.world.get_component_mut(self.entity)
    }

    /// Component of type `T`, default-constructed if missing
    pub fn get_or_add_component<T: Component + Default>(&mut self) -> Result<&mut T, EcsError> {
        self.world.get_or_add_component(self.entity)
    }

    /// Whether a `T` is attached
    pub fn has_component<T: Component>(&self) -> bool {
        self.world.has_component::<T>(self.entity)
    }

    /// Detach and return the `T`
    pub fn remove_component<T: Component>(&mut self) -> Option<T> {
        self.world.remove_component(self.entity)
    }

    /// Transform of this object, added if missing
    pub fn transform(&mut self) -> Result<&mut Transform, EcsError> {
        self.get_or_add_component::<Transform>()
    }

    /// Reparent under `parent`, see [`hierarchy::set_parent`]
    pub fn set_parent(&mut self, parent: Entity) -> Result<(), EcsError> {
        hierarchy::set_parent(self.world, self.entity, parent)
    }

    /// Parent entity
    pub fn parent(&self) -> Option<Entity> {
        hierarchy::get_parent(self.world, self.entity)
    }

    /// Direct children
    pub fn children(&self) -> Vec<Entity> {
        hierarchy::children(self.world, self.entity)
    }

    /// Create a child entity and borrow it
    pub fn add_child(&mut self) -> Result<GameObject<'_>, EcsError> {
        let child = hierarchy::add_child(self.world, self.entity)?;
        Ok(GameObject::new(self.world, child))
    }

    /// Whether any entity in the world carries a camera
    pub fn has_camera(&self) -> bool {
        self.world.count::<Camera>() > 0
    }

    /// Destroy the entity, consuming the handle
    pub fn destroy(self) -> Result<(), EcsError> {
        self.world.destroy_entity(self.entity)
    }
}

/// Read-only, copyable view of an entity
///
/// Any number of these may exist at once; mutation goes through
/// [`GameObject`].
#[derive(Clone, Copy)]
pub struct GameObjectRef<'w> {
    world: &'w World,
    entity: Entity,
}

impl<'w> GameObjectRef<'w> {
    pub(crate) fn new(world: &'w World, entity: Entity) -> Self {
        Self { world, entity }
    }

    /// Entity id
    pub fn id(&self) -> Entity {
        self.entity
    }

    /// Component of type `T`
    pub fn get_component<T: Component>(&self) -> Option<&'w T> {
        self.world.get_component(self.entity)
    }

    /// Whether a `T` is attached
    pub fn has_component<T: Component>(&self) -> bool {
        self.world.has_component::<T>(self.entity)
    }

    /// Parent, if any
    pub fn parent(&self) -> Option<GameObjectRef<'w>> {
        hierarchy::get_parent(self.world, self.entity).map(|parent| Self::new(self.world, parent))
    }

    /// Direct children
    pub fn children(&self) -> Vec<GameObjectRef<'w>> {
        hierarchy::children(self.world, self.entity)
            .into_iter()
            .map(|child| Self::new(self.world, child))
            .collect()
    }

    /// Whether any entity in the world carries a camera
    pub fn has_camera(&self) -> bool {
        self.world.count::<Camera>() > 0
    }
}

impl PartialEq for GameObjectRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.world, other.world) && self.entity == other.entity
    }
}

impl std::fmt::Debug for GameObjectRef<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("GameObjectRef").field(&self.entity).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_game_object_component_access() {
        let mut world = World::new();
        let mut object = world.spawn();
        object.transform().unwrap().set_position([1.0, 2.0, 3.0].into());

        assert!(object.has_component::<Transform>());
        let position = object.get_component::<Transform>().unwrap().position();
        assert_eq!(position.as_array(), &[1.0, 2.0, 3.0]);

        assert!(object.remove_component::<Transform>().is_some());
        assert!(!object.has_component::<Transform>());
    }

    #[test]
    fn test_add_child_through_handle() {
        let mut world = World::new();
        let mut parent = world.spawn();
        let parent_id = parent.id();
        let child_id = parent.add_child().unwrap().id();

        assert_eq!(parent.children(), vec![child_id]);
        assert_eq!(world.game_object(child_id).unwrap().parent(), Some(parent_id));
    }

    #[test]
    fn test_has_camera_is_world_wide() {
        let mut world = World::new();
        let watcher = world.create_entity();
        let camera = world.create_entity();
        assert!(!world.game_object(watcher).unwrap().has_camera());

        world.add_component(camera, Camera::default()).unwrap();
        assert!(world.game_object(watcher).unwrap().has_camera());
    }

    #[test]
    fn test_destroy_through_handle() {
        let mut world = World::new();
        let id = world.spawn().id();
        world.game_object(id).unwrap().destroy().unwrap();
        assert!(!world.is_alive(id));
        assert!(world.game_object(id).is_err());
    }

    #[test]
    fn test_refs_are_copyable_and_coexist() {
        let mut world = World::new();
        let mut parent = world.spawn();
        parent.transform().unwrap();
        let parent_id = parent.id();
        let child_id = parent.add_child().unwrap().id();

        let a = world.object_ref(parent_id).unwrap();
        let b = a;
        let child = world.object_ref(child_id).unwrap();

        assert_eq!(a, b);
        assert_eq!(child.parent(), Some(a));
        assert_eq!(b.children(), vec![child]);
        assert!(a.get_component::<Transform>().is_some());
        assert!(!child.has_component::<Transform>());
        assert!(!child.has_camera());
    }

    #[test]
    fn test_ref_to_dead_entity_fails() {
        let mut world = World::new();
        let id = world.create_entity();
        world.destroy_entity(id).unwrap();
        assert_eq!(world.object_ref(id).unwrap_err(), EcsError::EntityNotFound(id));
    }
}

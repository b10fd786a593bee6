//! The entity store

use super::components::Relationship;
use super::storage::AnyStorage;
use super::{hierarchy, Component, ComponentStorage, EcsError, Entity, GameObject, GameObjectRef};
use slotmap::SlotMap;
use std::any::TypeId;
use std::collections::HashMap;

/// Owns every entity and every component table
///
/// One `World` belongs to one [`Scene`](crate::scene::Scene). Handles such as
/// [`GameObject`] borrow it and cannot outlive it.
#[derive(Default)]
pub struct World {
    entities: SlotMap<Entity, ()>,
    storages: HashMap<TypeId, Box<dyn AnyStorage>>,
    // owners in tables taken out by `storage_scope`
    checked_out: HashMap<TypeId, Vec<Entity>>,
}

impl World {
    /// Create an empty world
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate an entity with no components
    pub fn create_entity(&mut self) -> Entity {
        let entity = self.entities.insert(());
        log::trace!("Created {}", entity);
        entity
    }

    /// Whether `entity` exists
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.entities.contains_key(entity)
    }

    /// Number of live entities
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Iterate all live entities
    pub fn entities(&self) -> impl Iterator<Item = Entity> + '_ {
        self.entities.keys()
    }

    /// Destroy `entity` and all of its components
    ///
    /// The entity is removed from its parent's child set and its children
    /// become roots.
    pub fn destroy_entity(&mut self, entity: Entity) -> Result<(), EcsError> {
        self.ensure_alive(entity)?;
        self.unlink(entity)?;

        for storage in self.storages.values_mut() {
            storage.remove_entity(entity);
        }
        self.entities.remove(entity);

        log::trace!("Destroyed {}", entity);
        Ok(())
    }

    /// Attach `component` to `entity`
    ///
    /// Dependencies declared by [`Component::register_dependencies`] are
    /// added first. Fails with [`EcsError::DuplicateComponent`] if the entity
    /// already has a `T`, and with [`EcsError::PolicyViolation`] if `T` is a
    /// singleton that already exists elsewhere.
    pub fn add_component<T: Component>(&mut self, entity: Entity, mut component: T) -> Result<&mut T, EcsError> {
        self.ensure_alive(entity)?;

        if self.has_component::<T>(entity) {
            return Err(EcsError::DuplicateComponent {
                entity,
                type_name: std::any::type_name::<T>(),
            });
        }

        if T::SINGLETON {
            if let Some(existing) = self.any_owner::<T>() {
                return Err(EcsError::PolicyViolation(format!(
                    "only one {} may exist, already attached to {}",
                    std::any::type_name::<T>(),
                    existing
                )));
            }
        }

        T::register_dependencies(self, entity)?;
        component.on_attach(entity);

        Ok(self.storage_or_insert::<T>().insert(entity, component))
    }

    /// Return the `T` of `entity`, adding a default one first if missing
    pub fn get_or_add_component<T: Component + Default>(&mut self, entity: Entity) -> Result<&mut T, EcsError> {
        self.get_or_insert_with(entity, T::default)
    }

    /// Return the `T` of `entity`, adding `make()` first if missing
    pub fn get_or_insert_with<T: Component>(
        &mut self,
        entity: Entity,
        make: impl FnOnce() -> T,
    ) -> Result<&mut T, EcsError> {
        self.ensure_alive(entity)?;
        if !self.has_component::<T>(entity) {
            return self.add_component(entity, make());
        }
        self.get_component_mut::<T>(entity).ok_or_else(|| {
            EcsError::InvalidOperation(format!(
                "the {} of {} is borrowed for its update",
                std::any::type_name::<T>(),
                entity
            ))
        })
    }

    /// The `T` of `entity`
    pub fn get_component<T: Component>(&self, entity: Entity) -> Option<&T> {
        self.storage::<T>()?.get(entity)
    }

    /// The `T` of `entity`, mutably
    pub fn get_component_mut<T: Component>(&mut self, entity: Entity) -> Option<&mut T> {
        self.storage_mut::<T>()?.get_mut(entity)
    }

    /// Whether `entity` has a `T`
    ///
    /// Also true while the `T` table is borrowed by [`World::storage_scope`].
    pub fn has_component<T: Component>(&self, entity: Entity) -> bool {
        self.storage::<T>().map_or(false, |storage| storage.contains(entity))
            || self
                .checked_out
                .get(&TypeId::of::<T>())
                .is_some_and(|owners| owners.contains(&entity))
    }

    /// Detach and return the `T` of `entity`
    ///
    /// Removing a [`Relationship`] first unlinks the entity from its parent and
    /// turns its children into roots, so no link is left one-sided.
    pub fn remove_component<T: Component>(&mut self, entity: Entity) -> Option<T> {
        if TypeId::of::<T>() == TypeId::of::<Relationship>() && self.has_component::<T>(entity) {
            self.unlink(entity).ok()?;
        }
        self.storage_mut::<T>()?.remove(entity)
    }

    /// Iterate every `(entity, &T)`
    pub fn view<T: Component>(&self) -> impl Iterator<Item = (Entity, &T)> {
        self.storage::<T>().into_iter().flat_map(|storage| storage.iter())
    }

    /// Iterate every `(entity, &mut T)`
    pub fn view_mut<T: Component>(&mut self) -> impl Iterator<Item = (Entity, &mut T)> {
        self.storage_mut::<T>().into_iter().flat_map(|storage| storage.iter_mut())
    }

    /// Entities that have a `T`
    pub fn entities_with<T: Component>(&self) -> Vec<Entity> {
        self.storage::<T>()
            .map(|storage| storage.entities().to_vec())
            .unwrap_or_default()
    }

    /// Number of `T` components in the world, including a borrowed table
    pub fn count<T: Component>(&self) -> usize {
        let borrowed = self.checked_out.get(&TypeId::of::<T>()).map_or(0, |owners| {
            owners.iter().filter(|&&owner| self.is_alive(owner)).count()
        });
        self.storage::<T>().map_or(0, ComponentStorage::len) + borrowed
    }

    /// Type names and sizes of every non-empty component table
    pub fn component_summary(&self) -> Vec<(&'static str, usize)> {
        let mut summary: Vec<_> = self
            .storages
            .values()
            .filter(|storage| storage.len() > 0)
            .map(|storage| (storage.type_name(), storage.len()))
            .collect();
        summary.sort_unstable();
        summary
    }

    /// Borrow the `T` table mutably alongside the rest of the world
    ///
    /// The table is taken out of the world while `f` runs, so `f` may freely
    /// use the world, but `get`/`view` of `T` through it see only components
    /// added during `f`. Owners in the borrowed table still count for
    /// [`World::has_component`], the duplicate check and the singleton check.
    /// Components of type `T` added during `f` are merged back afterwards, and
    /// components of entities destroyed during `f` are dropped.
    pub fn storage_scope<T: Component, R>(
        &mut self,
        f: impl FnOnce(&mut ComponentStorage<T>, &mut World) -> R,
    ) -> R {
        let type_id = TypeId::of::<T>();
        let mut storage = self.take_storage::<T>(type_id).unwrap_or_default();
        let outer = self.checked_out.insert(type_id, storage.entities().to_vec());

        let result = f(&mut storage, self);

        match outer {
            Some(owners) => self.checked_out.insert(type_id, owners),
            None => self.checked_out.remove(&type_id),
        };
        if let Some(added) = self.take_storage::<T>(type_id) {
            for entity in storage.absorb(added) {
                log::warn!("Dropped a second {} added to {} during its update", std::any::type_name::<T>(), entity);
            }
        }
        storage.retain(|entity| self.entities.contains_key(entity));
        self.storages.insert(type_id, Box::new(storage));

        result
    }

    /// Borrow `entity` as a [`GameObject`]
    pub fn game_object(&mut self, entity: Entity) -> Result<GameObject<'_>, EcsError> {
        self.ensure_alive(entity)?;
        Ok(GameObject::new(self, entity))
    }

    /// Read-only, copyable handle to `entity`
    pub fn object_ref(&self, entity: Entity) -> Result<GameObjectRef<'_>, EcsError> {
        self.ensure_alive(entity)?;
        Ok(GameObjectRef::new(self, entity))
    }

    /// Create an entity and borrow it as a [`GameObject`]
    pub fn spawn(&mut self) -> GameObject<'_> {
        let entity = self.create_entity();
        GameObject::new(self, entity)
    }

    pub(crate) fn ensure_alive(&self, entity: Entity) -> Result<(), EcsError> {
        if self.is_alive(entity) {
            Ok(())
        } else {
            Err(EcsError::EntityNotFound(entity))
        }
    }

    /// The `T` table, if any `T` was ever added
    pub fn storage<T: Component>(&self) -> Option<&ComponentStorage<T>> {
        self.storages
            .get(&TypeId::of::<T>())
            .and_then(|storage| storage.as_any().downcast_ref())
    }

    fn any_owner<T: Component>(&self) -> Option<Entity> {
        if let Some((owner, _)) = self.view::<T>().next() {
            return Some(owner);
        }
        self.checked_out
            .get(&TypeId::of::<T>())?
            .iter()
            .copied()
            .find(|&owner| self.is_alive(owner))
    }

    // Detach from the parent and orphan the children
    fn unlink(&mut self, entity: Entity) -> Result<(), EcsError> {
        hierarchy::detach(self, entity)?;
        for child in hierarchy::children(self, entity) {
            if let Some(relationship) = self.get_component_mut::<Relationship>(child) {
                relationship.set_parent(None);
            }
        }
        if let Some(relationship) = self.get_component_mut::<Relationship>(entity) {
            relationship.clear_children();
        }
        Ok(())
    }

    fn storage_mut<T: Component>(&mut self) -> Option<&mut ComponentStorage<T>> {
        self.storages
            .get_mut(&TypeId::of::<T>())
            .and_then(|storage| storage.as_any_mut().downcast_mut())
    }

    fn storage_or_insert<T: Component>(&mut self) -> &mut ComponentStorage<T> {
        let storage = self
            .storages
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Box::new(ComponentStorage::<T>::new()));
        match storage.as_any_mut().downcast_mut() {
            Some(storage) => storage,
            None => unreachable!("component table registered under the wrong type id"),
        }
    }

    fn take_storage<T: Component>(&mut self, type_id: TypeId) -> Option<ComponentStorage<T>> {
        let storage = self.storages.remove(&type_id)?;
        storage.into_any().downcast::<ComponentStorage<T>>().ok().map(|boxed| *boxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, PartialEq)]
    struct Position(i32);
    impl Component for Position {}

    #[derive(Debug, Default, PartialEq)]
    struct Velocity(i32);
    impl Component for Velocity {
        fn register_dependencies(world: &mut World, owner: Entity) -> Result<(), EcsError> {
            world.get_or_add_component::<Position>(owner).map(|_| ())
        }
    }

    #[derive(Debug, Default)]
    struct Director;
    impl Component for Director {
        const SINGLETON: bool = true;
    }

    #[derive(Debug, Default)]
    struct Tagged {
        owner: Option<Entity>,
    }
    impl Component for Tagged {
        fn on_attach(&mut self, owner: Entity) {
            self.owner = Some(owner);
        }
    }

    #[test]
    fn test_add_and_get() {
        let mut world = World::new();
        let e = world.create_entity();
        world.add_component(e, Position(4)).unwrap();

        assert!(world.has_component::<Position>(e));
        assert_eq!(world.get_component::<Position>(e), Some(&Position(4)));
        assert!(!world.has_component::<Velocity>(e));
    }

    #[test]
    fn test_duplicate_component_is_rejected() {
        let mut world = World::new();
        let e = world.create_entity();
        world.add_component(e, Position(1)).unwrap();

        let err = world.add_component(e, Position(2)).unwrap_err();
        assert!(matches!(err, EcsError::DuplicateComponent { .. }));
        assert_eq!(world.get_component::<Position>(e), Some(&Position(1)));
    }

    #[test]
    fn test_dependencies_are_added() {
        let mut world = World::new();
        let e = world.create_entity();
        world.add_component(e, Velocity(3)).unwrap();
        assert_eq!(world.get_component::<Position>(e), Some(&Position(0)));
    }

    #[test]
    fn test_singleton_policy() {
        let mut world = World::new();
        let a = world.create_entity();
        let b = world.create_entity();
        world.add_component(a, Director).unwrap();

        let err = world.add_component(b, Director).unwrap_err();
        assert!(matches!(err, EcsError::PolicyViolation(_)));
        assert!(world.has_component::<Director>(a));
        assert!(!world.has_component::<Director>(b));
    }

    #[test]
    fn test_on_attach_receives_owner() {
        let mut world = World::new();
        let e = world.create_entity();
        let tagged = world.add_component(e, Tagged::default()).unwrap();
        assert_eq!(tagged.owner, Some(e));
    }

    #[test]
    fn test_dead_entities_are_rejected() {
        let mut world = World::new();
        let e = world.create_entity();
        world.destroy_entity(e).unwrap();

        assert!(!world.is_alive(e));
        assert_eq!(world.add_component(e, Position(0)).unwrap_err(), EcsError::EntityNotFound(e));
        assert!(world.destroy_entity(e).is_err());

        // the slot may be reused, but never under the old id
        let reused = world.create_entity();
        assert_ne!(reused, e);
    }

    #[test]
    fn test_destroy_removes_components() {
        let mut world = World::new();
        let a = world.create_entity();
        let b = world.create_entity();
        world.add_component(a, Position(1)).unwrap();
        world.add_component(b, Position(2)).unwrap();

        world.destroy_entity(a).unwrap();
        assert_eq!(world.count::<Position>(), 1);
        assert_eq!(world.entities_with::<Position>(), vec![b]);
    }

    #[test]
    fn test_get_or_add_returns_existing() {
        let mut world = World::new();
        let e = world.create_entity();
        world.add_component(e, Position(9)).unwrap();
        assert_eq!(world.get_or_add_component::<Position>(e).unwrap(), &Position(9));
    }

    #[test]
    fn test_storage_scope_sees_world() {
        let mut world = World::new();
        let a = world.create_entity();
        let b = world.create_entity();
        world.add_component(a, Position(1)).unwrap();
        world.add_component(b, Position(2)).unwrap();

        world.storage_scope::<Position, _>(|positions, world| {
            for (_, position) in positions.iter_mut() {
                position.0 += 10;
            }
            let c = world.create_entity();
            world.add_component(c, Position(100)).unwrap();
            world.destroy_entity(a).unwrap();
        });

        assert_eq!(world.count::<Position>(), 2);
        assert_eq!(world.get_component::<Position>(b), Some(&Position(12)));
        assert!(world.view::<Position>().any(|(_, p)| *p == Position(100)));
    }

    #[test]
    fn test_storage_scope_keeps_duplicate_check() {
        let mut world = World::new();
        let a = world.create_entity();
        world.add_component(a, Position(1)).unwrap();

        let result = world.storage_scope::<Position, _>(|_, world| {
            assert!(world.has_component::<Position>(a));
            assert_eq!(world.count::<Position>(), 1);
            world.add_component(a, Position(2)).map(|_| ())
        });

        assert!(matches!(result, Err(EcsError::DuplicateComponent { .. })));
        assert_eq!(world.get_component::<Position>(a), Some(&Position(1)));
    }

    #[test]
    fn test_storage_scope_keeps_singleton_check() {
        let mut world = World::new();
        let a = world.create_entity();
        world.add_component(a, Director).unwrap();

        let result = world.storage_scope::<Director, _>(|_, world| {
            let b = world.create_entity();
            world.add_component(b, Director).map(|_| ())
        });

        assert!(matches!(result, Err(EcsError::PolicyViolation(_))));
        assert_eq!(world.count::<Director>(), 1);
        assert!(world.has_component::<Director>(a));
    }

    #[test]
    fn test_singleton_owner_destroyed_in_scope_frees_the_slot() {
        let mut world = World::new();
        let a = world.create_entity();
        world.add_component(a, Director).unwrap();

        let b = world.storage_scope::<Director, _>(|_, world| {
            world.destroy_entity(a).unwrap();
            let b = world.create_entity();
            world.add_component(b, Director).unwrap();
            b
        });

        assert_eq!(world.entities_with::<Director>(), vec![b]);
    }

    #[test]
    fn test_removing_relationship_unlinks_both_sides() {
        let mut world = World::new();
        let root = world.create_entity();
        let middle = hierarchy::add_child(&mut world, root).unwrap();
        let leaf = hierarchy::add_child(&mut world, middle).unwrap();

        assert!(world.remove_component::<Relationship>(middle).is_some());

        assert_eq!(hierarchy::children(&world, root), Vec::<Entity>::new());
        assert_eq!(hierarchy::get_parent(&world, leaf), None);
        assert_eq!(hierarchy::get_parent(&world, middle), None);
        assert!(world.remove_component::<Relationship>(middle).is_none());
    }

    #[test]
    fn test_view_mut_and_summary() {
        let mut world = World::new();
        for i in 0..3 {
            let e = world.create_entity();
            world.add_component(e, Position(i)).unwrap();
        }
        for (_, position) in world.view_mut::<Position>() {
            position.0 *= 2;
        }
        let sum: i32 = world.view::<Position>().map(|(_, p)| p.0).sum();
        assert_eq!(sum, 6);
        assert_eq!(world.component_summary().len(), 1);
    }
}

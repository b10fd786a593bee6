//! Sparse-set component storage
//!
//! Each component type gets one [`ComponentStorage`]: a dense array of
//! components, a parallel array of owning entities, and a sparse map from
//! entity to dense index. Removal swaps the last element into the hole.

use super::{Component, Entity};
use slotmap::SecondaryMap;
use std::any::Any;

/// Dense table of one component type
pub struct ComponentStorage<T> {
    sparse: SecondaryMap<Entity, usize>,
    entities: Vec<Entity>,
    components: Vec<T>,
}

impl<T> Default for ComponentStorage<T> {
    fn default() -> Self {
        Self {
            sparse: SecondaryMap::new(),
            entities: Vec::new(),
            components: Vec::new(),
        }
    }
}

impl<T: Component> ComponentStorage<T> {
    /// Empty storage
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored components
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Whether no component is stored
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Whether `entity` has a component here
    pub fn contains(&self, entity: Entity) -> bool {
        self.sparse.contains_key(entity)
    }

    /// Component of `entity`
    pub fn get(&self, entity: Entity) -> Option<&T> {
        self.sparse.get(entity).map(|&index| &self.components[index])
    }

    /// Mutable component of `entity`
    pub fn get_mut(&mut self, entity: Entity) -> Option<&mut T> {
        match self.sparse.get(entity) {
            Some(&index) => Some(&mut self.components[index]),
            None => None,
        }
    }

    /// Insert or replace the component of `entity`
    pub fn insert(&mut self, entity: Entity, component: T) -> &mut T {
        if let Some(&index) = self.sparse.get(entity) {
            self.components[index] = component;
            return &mut self.components[index];
        }

        let index = self.components.len();
        self.sparse.insert(entity, index);
        self.entities.push(entity);
        self.components.push(component);
        &mut self.components[index]
    }

    /// Remove and return the component of `entity`
    pub fn remove(&mut self, entity: Entity) -> Option<T> {
        let index = self.sparse.remove(entity)?;
        self.entities.swap_remove(index);
        let component = self.components.swap_remove(index);

        if let Some(&moved) = self.entities.get(index) {
            self.sparse.insert(moved, index);
        }

        Some(component)
    }

    /// Owning entities in storage order
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// Iterate `(owner, component)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (Entity, &T)> {
        self.entities.iter().copied().zip(self.components.iter())
    }

    /// Iterate `(owner, component)` pairs mutably
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Entity, &mut T)> {
        self.entities.iter().copied().zip(self.components.iter_mut())
    }

    /// Keep only the components whose owner passes `keep`
    pub fn retain(&mut self, mut keep: impl FnMut(Entity) -> bool) {
        let doomed: Vec<Entity> = self.entities.iter().copied().filter(|&e| !keep(e)).collect();
        for entity in doomed {
            self.remove(entity);
        }
    }

    /// Move the components of `other` into this storage
    ///
    /// Entries are never replaced: owners that already have a component here
    /// keep it, and are returned.
    pub fn absorb(&mut self, other: ComponentStorage<T>) -> Vec<Entity> {
        let mut refused = Vec::new();
        for (entity, component) in other.entities.into_iter().zip(other.components) {
            if self.contains(entity) {
                refused.push(entity);
            } else {
                self.insert(entity, component);
            }
        }
        refused
    }
}

/// Type-erased access used by [`World`](super::World)
pub(crate) trait AnyStorage {
    fn remove_entity(&mut self, entity: Entity) -> bool;
    fn len(&self) -> usize;
    fn type_name(&self) -> &'static str;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

impl<T: Component> AnyStorage for ComponentStorage<T> {
    fn remove_entity(&mut self, entity: Entity) -> bool {
        self.remove(entity).is_some()
    }

    fn len(&self) -> usize {
        self.components.len()
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

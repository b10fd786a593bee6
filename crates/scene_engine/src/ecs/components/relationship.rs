//! Parent/child link storage

use crate::ecs::{Component, Entity};
use std::collections::BTreeSet;

/// Optional parent plus the set of direct children
///
/// Only [`hierarchy`](crate::ecs::hierarchy) edits these, keeping both ends of
/// every link in agreement.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Relationship {
    parent: Option<Entity>,
    children: BTreeSet<Entity>,
}

impl Component for Relationship {}

impl Relationship {
    /// Parent entity
    pub fn parent(&self) -> Option<Entity> {
        self.parent
    }

    /// Direct children in id order
    pub fn children(&self) -> impl Iterator<Item = Entity> + '_ {
        self.children.iter().copied()
    }

    /// Whether `entity` is a direct child
    pub fn has_child(&self, entity: Entity) -> bool {
        self.children.contains(&entity)
    }

    /// Number of direct children
    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    pub(crate) fn set_parent(&mut self, parent: Option<Entity>) {
        self.parent = parent;
    }

    pub(crate) fn insert_child(&mut self, child: Entity) {
        self.children.insert(child);
    }

    pub(crate) fn remove_child(&mut self, child: Entity) {
        self.children.remove(&child);
    }

    pub(crate) fn clear_children(&mut self) {
        self.children.clear();
    }
}

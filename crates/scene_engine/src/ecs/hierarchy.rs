//! Parent/child links between entities
//!
//! Links are stored as [`Relationship`] components on both ends. Every
//! function here validates its arguments before touching either side, so a
//! failed call leaves the graph exactly as it was.

use super::components::Relationship;
use super::{EcsError, Entity, World};

/// Make `parent` the parent of `child`
///
/// `child` is detached from its previous parent first. Parenting an entity
/// to itself or to one of its own descendants fails with
/// [`EcsError::InvalidOperation`].
pub fn set_parent(world: &mut World, child: Entity, parent: Entity) -> Result<(), EcsError> {
    world.ensure_alive(child)?;
    world.ensure_alive(parent)?;

    if child == parent {
        return Err(EcsError::InvalidOperation(format!("{child} cannot be its own parent")));
    }
    if is_ancestor(world, child, parent) {
        return Err(EcsError::InvalidOperation(format!(
            "{parent} is a descendant of {child}, parenting would form a cycle"
        )));
    }
    if get_parent(world, child) == Some(parent) {
        return Ok(());
    }

    detach(world, child)?;
    world.get_or_add_component::<Relationship>(parent)?.insert_child(child);
    world.get_or_add_component::<Relationship>(child)?.set_parent(Some(parent));
    Ok(())
}

/// Remove `entity` from its parent, making it a root
pub fn detach(world: &mut World, entity: Entity) -> Result<(), EcsError> {
    world.ensure_alive(entity)?;

    let Some(parent) = get_parent(world, entity) else {
        return Ok(());
    };
    if let Some(relationship) = world.get_component_mut::<Relationship>(parent) {
        relationship.remove_child(entity);
    }
    if let Some(relationship) = world.get_component_mut::<Relationship>(entity) {
        relationship.set_parent(None);
    }
    Ok(())
}

/// Parent of `entity`, or `None` for roots and entities without links
pub fn get_parent(world: &World, entity: Entity) -> Option<Entity> {
    world.get_component::<Relationship>(entity)?.parent()
}

/// Direct children of `entity`, in id order
pub fn children(world: &World, entity: Entity) -> Vec<Entity> {
    world
        .get_component::<Relationship>(entity)
        .map(|relationship| relationship.children().collect())
        .unwrap_or_default()
}

/// Create a new entity parented to `parent`
pub fn add_child(world: &mut World, parent: Entity) -> Result<Entity, EcsError> {
    world.ensure_alive(parent)?;
    let child = world.create_entity();
    set_parent(world, child, parent)?;
    Ok(child)
}

/// Whether `ancestor` appears on the parent chain of `entity`
pub fn is_ancestor(world: &World, ancestor: Entity, entity: Entity) -> bool {
    ancestors(world, entity).any(|e| e == ancestor)
}

/// Walk up from the parent of `entity` to its root
pub fn ancestors(world: &World, entity: Entity) -> impl Iterator<Item = Entity> + '_ {
    std::iter::successors(get_parent(world, entity), move |&current| get_parent(world, current))
}

/// Topmost ancestor of `entity`, or `entity` itself when it has no parent
pub fn root_of(world: &World, entity: Entity) -> Entity {
    ancestors(world, entity).last().unwrap_or(entity)
}

/// Entities that have no parent
pub fn roots(world: &World) -> Vec<Entity> {
    world.entities().filter(|&e| get_parent(world, e).is_none()).collect()
}

/// `entity` and all its descendants, parents before children
pub fn descendants(world: &World, entity: Entity) -> Vec<Entity> {
    let mut result = vec![entity];
    let mut next = 0;
    while next < result.len() {
        let current = result[next];
        result.extend(children(world, current));
        next += 1;
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_child_links_both_sides() {
        let mut world = World::new();
        let root = world.create_entity();
        let child = add_child(&mut world, root).unwrap();

        assert_eq!(get_parent(&world, child), Some(root));
        assert_eq!(children(&world, root), vec![child]);
        assert_eq!(get_parent(&world, root), None);
    }

    #[test]
    fn test_detach() {
        let mut world = World::new();
        let root = world.create_entity();
        let child = add_child(&mut world, root).unwrap();

        detach(&mut world, child).unwrap();
        assert_eq!(get_parent(&world, child), None);
        assert!(children(&world, root).is_empty());
    }

    #[test]
    fn test_ancestry_queries() {
        let mut world = World::new();
        let a = world.create_entity();
        let b = add_child(&mut world, a).unwrap();
        let c = add_child(&mut world, b).unwrap();
        let d = add_child(&mut world, a).unwrap();

        assert!(is_ancestor(&world, a, c));
        assert!(!is_ancestor(&world, c, a));
        assert_eq!(ancestors(&world, c).collect::<Vec<_>>(), vec![b, a]);
        assert_eq!(root_of(&world, c), a);
        assert_eq!(roots(&world), vec![a]);

        let all = descendants(&world, a);
        assert_eq!(all.len(), 4);
        assert_eq!(all[0], a);
        assert!(all.contains(&d));
    }

    #[test]
    fn test_entity_without_links_has_no_parent() {
        let mut world = World::new();
        let lonely = world.create_entity();
        assert_eq!(get_parent(&world, lonely), None);
        assert!(children(&world, lonely).is_empty());
    }
}

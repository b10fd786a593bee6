//! Component trait

use super::{EcsError, Entity, World};

/// Data attached to at most one entity per type
///
/// Implementors can require other components to be present and learn the
/// entity that owns them when they are attached.
pub trait Component: 'static {
    /// At most one instance of this type may exist in a [`World`]
    const SINGLETON: bool = false;

    /// Add components this one depends on, before it is inserted
    ///
    /// Implementations typically call
    /// [`World::get_or_add_component`] for each dependency.
    fn register_dependencies(world: &mut World, owner: Entity) -> Result<(), EcsError> {
        let _ = (world, owner);
        Ok(())
    }

    /// Called once with the owning entity just before insertion
    fn on_attach(&mut self, owner: Entity) {
        let _ = owner;
    }
}

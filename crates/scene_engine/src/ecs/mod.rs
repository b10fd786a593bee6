//! Entity-Component store and scene graph
//!
//! Entities are opaque generational ids. Components live in one sparse-set
//! table per type, so has/get are O(1) and views iterate densely. Parent/child
//! links are ordinary [`Relationship`](components::Relationship) components
//! kept consistent by the functions in [`hierarchy`].

pub mod entity;
pub mod component;
pub mod storage;
pub mod world;
pub mod game_object;
pub mod hierarchy;
pub mod components;

#[cfg(test)]
mod tests;

pub use component::Component;
pub use entity::Entity;
pub use game_object::{GameObject, GameObjectRef};
pub use storage::ComponentStorage;
pub use world::World;

/// Errors raised by entity and component operations
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EcsError {
    /// The entity was never created or has been destroyed
    #[error("Entity {0} does not exist")]
    EntityNotFound(Entity),

    /// The entity already carries a component of this type
    #[error("Entity {entity} already has a {type_name} component")]
    DuplicateComponent {
        /// Target entity
        entity: Entity,
        /// Rust type name of the component
        type_name: &'static str,
    },

    /// A store-wide rule would be broken, e.g. a second camera
    #[error("Policy violation: {0}")]
    PolicyViolation(String),

    /// The operation makes no sense for its arguments
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
}

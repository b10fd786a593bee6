//! Entity identifiers

use slotmap::Key;
use std::fmt;

slotmap::new_key_type! {
    /// Opaque entity id: slot index plus generation
    ///
    /// A destroyed entity's slot can be reused, but with a new generation, so
    /// stale ids never alias a live entity.
    pub struct Entity;
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entity({:?})", self.data())
    }
}

//! Built-in components

pub mod relationship;
pub mod transform;
pub mod camera;
pub mod mesh_renderer;

pub use camera::Camera;
pub use mesh_renderer::{MeshRenderer, TextureType};
pub use relationship::Relationship;
pub use transform::Transform;

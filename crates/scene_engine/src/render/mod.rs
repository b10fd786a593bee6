//! Rendering interface
//!
//! The engine does not talk to a GPU API directly. It drives a
//! [`RenderBackend`] through the [`Renderer`], which owns the backend, the
//! texture store and the queue of GPU resources waiting to be released.
//!
//! [`RecordingBackend`] is a headless backend that records everything it is
//! asked to do; the viewer and the tests run against it.

pub mod backend;
pub mod recording;
pub mod resources;
// bytemuck derives emit `unsafe impl`
#[allow(unsafe_code)]
pub mod mesh;
pub mod texture;
pub mod renderer;

pub use backend::{DrawCall, GpuResource, IndexBufferId, RenderBackend, RenderState, TextureId, VertexBufferId};
pub use mesh::{IndexFormat, Mesh, Primitive, Vertex};
pub use recording::{RecordingBackend, RecordingLog};
pub use renderer::Renderer;
pub use resources::{GpuHandle, IndexBuffer, ReleaseQueue, Texture, VertexBuffer};
pub use texture::{TextureFormat, TextureHandle, TextureImage, TextureStore};

use crate::ecs::Entity;
use crate::foundation::math::MathError;

/// Rendering errors
#[derive(thiserror::Error, Debug)]
pub enum RenderError {
    /// The backend could not create a buffer or texture
    #[error("Resource creation failed: {0}")]
    ResourceCreationFailure(String),

    /// A handle does not refer to a live backend resource
    #[error("Invalid handle: {0:?}")]
    InvalidHandle(GpuResource),

    /// Image bytes could not be decoded
    #[error("Image decode failed: {0}")]
    Image(#[from] image::ImageError),

    /// The decoded image has a pixel layout the backend cannot upload
    #[error("Unsupported texture format: {0}")]
    UnsupportedTextureFormat(String),

    /// A renderable entity has no transform to place it with
    #[error("Entity {0} has no Transform")]
    MissingTransform(Entity),

    /// View or projection could not be computed
    #[error("Math error: {0}")]
    Math(#[from] MathError),
}

/// Result type for rendering operations
pub type RenderResult<T> = Result<T, RenderError>;

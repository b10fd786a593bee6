//! Backend abstraction
//!
//! Everything the core asks of a GPU API: create and destroy buffers and
//! textures, set the camera, submit indexed draws, and end the frame.

use super::{RenderResult, TextureImage, Vertex};
use bitflags::bitflags;

/// Backend vertex buffer id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexBufferId(pub u32);

/// Backend index buffer id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IndexBufferId(pub u32);

/// Backend texture id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureId(pub u32);

/// Any resource a backend can destroy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GpuResource {
    /// Vertex buffer
    VertexBuffer(VertexBufferId),
    /// Index buffer
    IndexBuffer(IndexBufferId),
    /// Texture
    Texture(TextureId),
}

impl From<VertexBufferId> for GpuResource {
    fn from(id: VertexBufferId) -> Self {
        Self::VertexBuffer(id)
    }
}

impl From<IndexBufferId> for GpuResource {
    fn from(id: IndexBufferId) -> Self {
        Self::IndexBuffer(id)
    }
}

impl From<TextureId> for GpuResource {
    fn from(id: TextureId) -> Self {
        Self::Texture(id)
    }
}

bitflags! {
    /// Fixed-function state for one draw
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct RenderState: u32 {
        /// Write red, green and blue
        const WRITE_RGB = 1 << 0;
        /// Write alpha
        const WRITE_A = 1 << 1;
        /// Write depth
        const WRITE_Z = 1 << 2;
        /// Pass fragments closer than the stored depth
        const DEPTH_TEST_LESS = 1 << 3;
        /// Cull clockwise faces
        const CULL_CW = 1 << 4;
        /// Cull counter-clockwise faces
        const CULL_CCW = 1 << 5;
        /// Indices describe a triangle strip instead of a list
        const TRIANGLE_STRIP = 1 << 6;
        /// Multisampling
        const MSAA = 1 << 7;
    }
}

impl Default for RenderState {
    fn default() -> Self {
        Self::WRITE_RGB | Self::WRITE_A | Self::WRITE_Z | Self::DEPTH_TEST_LESS | Self::CULL_CW | Self::MSAA
    }
}

/// One indexed draw
///
/// Matrices are 16 floats in column-major order.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCall {
    /// Bound vertex buffer
    pub vertex_buffer: VertexBufferId,
    /// Bound index buffer
    pub index_buffer: IndexBufferId,
    /// Model-to-world matrix
    pub transform: [f32; 16],
    /// `u_baseColorFactor` uniform
    pub base_color: [f32; 4],
    /// Texture bound to the albedo sampler
    pub albedo: Option<TextureId>,
    /// Fixed-function state
    pub state: RenderState,
}

/// GPU API used by the [`Renderer`](super::Renderer)
pub trait RenderBackend {
    /// Short name for logs
    fn name(&self) -> &str;

    /// Whether clip-space depth runs from -1 to 1 (otherwise 0 to 1)
    fn homogeneous_depth(&self) -> bool;

    /// Upload vertices
    fn create_vertex_buffer(&mut self, vertices: &[Vertex]) -> RenderResult<VertexBufferId>;

    /// Upload 16-bit indices
    fn create_index_buffer(&mut self, indices: &[u16]) -> RenderResult<IndexBufferId>;

    /// Upload a decoded image
    fn create_texture(&mut self, image: &TextureImage) -> RenderResult<TextureId>;

    /// Free a resource; unknown ids are ignored
    fn destroy(&mut self, resource: GpuResource);

    /// Set view and projection for the following draws
    fn set_view_transform(&mut self, view: &[f32; 16], projection: &[f32; 16]);

    /// Submit one draw
    fn submit(&mut self, draw: &DrawCall) -> RenderResult<()>;

    /// Finish the frame and present
    fn frame(&mut self);
}

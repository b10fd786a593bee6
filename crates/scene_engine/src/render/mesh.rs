//! Vertex data, primitives and meshes

use super::backend::{DrawCall, RenderState, TextureId};
use super::resources::{IndexBuffer, VertexBuffer};
use super::{RenderError, RenderResult, Renderer, TextureHandle, TextureStore};
use crate::foundation::math::{Mat4, Vec4};
use bytemuck::{Pod, Zeroable};

/// GPU vertex: position plus texture coordinates normalised to `i16`
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    /// Object-space position
    pub position: [f32; 3],
    /// Texture coordinates scaled by `i16::MAX`
    pub uv: [i16; 2],
}

impl Vertex {
    /// Vertex from position and pre-quantised UV
    pub const fn new(position: [f32; 3], uv: [i16; 2]) -> Self {
        Self { position, uv }
    }

    /// Vertex from position and float UV in `[0, 1]`
    pub fn with_float_uv(position: [f32; 3], uv: [f32; 2]) -> Self {
        Self::new(position, uv.map(quantize_unorm))
    }

    /// View a vertex slice as raw bytes for upload
    pub fn as_bytes(vertices: &[Vertex]) -> &[u8] {
        bytemuck::cast_slice(vertices)
    }
}

fn quantize_unorm(value: f32) -> i16 {
    (value * f32::from(i16::MAX)) as i16
}

/// How a primitive's indices form triangles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IndexFormat {
    /// Every three indices are one triangle
    #[default]
    TriangleList,
    /// Each index after the second adds a triangle
    TriangleStrip,
}

impl IndexFormat {
    /// Draw state for this topology
    pub fn render_state(self) -> RenderState {
        match self {
            Self::TriangleList => RenderState::default(),
            Self::TriangleStrip => RenderState::default() | RenderState::TRIANGLE_STRIP,
        }
    }
}

/// One drawable piece of a mesh with its own buffers and material
#[derive(Debug)]
pub struct Primitive {
    format: IndexFormat,
    vertex_buffer: VertexBuffer,
    index_buffer: IndexBuffer,
    vertex_count: usize,
    index_count: usize,
    albedo: Option<TextureHandle>,
    base_color_factor: Vec4,
}

impl Primitive {
    /// Upload vertices and indices
    ///
    /// Every index must address an existing vertex. Buffers created before
    /// a failure are released with the partially built primitive.
    pub fn new(
        renderer: &mut Renderer,
        format: IndexFormat,
        vertices: &[Vertex],
        indices: &[u16],
        albedo: Option<TextureHandle>,
        base_color_factor: Vec4,
    ) -> RenderResult<Self> {
        if let Some(&bad) = indices.iter().find(|&&i| usize::from(i) >= vertices.len()) {
            return Err(RenderError::ResourceCreationFailure(format!(
                "index {bad} out of range for {} vertices",
                vertices.len()
            )));
        }

        let vertex_buffer = renderer.create_vertex_buffer(vertices)?;
        let index_buffer = renderer.create_index_buffer(indices)?;

        Ok(Self {
            format,
            vertex_buffer,
            index_buffer,
            vertex_count: vertices.len(),
            index_count: indices.len(),
            albedo,
            base_color_factor,
        })
    }

    /// Topology
    pub fn format(&self) -> IndexFormat {
        self.format
    }

    /// Owned vertex buffer
    pub fn vertex_buffer(&self) -> &VertexBuffer {
        &self.vertex_buffer
    }

    /// Owned index buffer
    pub fn index_buffer(&self) -> &IndexBuffer {
        &self.index_buffer
    }

    /// Number of vertices uploaded
    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    /// Number of indices uploaded
    pub fn index_count(&self) -> usize {
        self.index_count
    }

    /// Material albedo texture
    pub fn albedo(&self) -> Option<TextureHandle> {
        self.albedo
    }

    /// Material base color
    pub fn base_color_factor(&self) -> Vec4 {
        self.base_color_factor
    }

    /// Draw for this primitive placed by `transform`
    ///
    /// The primitive's own albedo wins over `fallback_albedo`.
    pub fn draw_call(&self, transform: &Mat4, textures: &TextureStore, fallback_albedo: Option<TextureId>) -> DrawCall {
        DrawCall {
            vertex_buffer: self.vertex_buffer.id(),
            index_buffer: self.index_buffer.id(),
            transform: transform.to_column_major_array(),
            base_color: self.base_color_factor.into(),
            albedo: self
                .albedo
                .and_then(|handle| textures.texture_id(handle))
                .or(fallback_albedo),
            state: self.format.render_state(),
        }
    }
}

/// A list of primitives drawn with the same transform
#[derive(Debug, Default)]
pub struct Mesh {
    primitives: Vec<Primitive>,
}

impl Mesh {
    /// Mesh from primitives
    pub fn new(primitives: Vec<Primitive>) -> Self {
        Self { primitives }
    }

    /// All primitives
    pub fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }

    /// Number of primitives
    pub fn len(&self) -> usize {
        self.primitives.len()
    }

    /// Whether the mesh has no primitives
    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::RecordingBackend;

    #[test]
    fn test_vertex_layout_is_tightly_packed() {
        assert_eq!(std::mem::size_of::<Vertex>(), 16);
        let vertices = [Vertex::new([1.0, 2.0, 3.0], [4, 5]); 2];
        assert_eq!(Vertex::as_bytes(&vertices).len(), 32);
    }

    #[test]
    fn test_uv_quantisation() {
        let vertex = Vertex::with_float_uv([0.0; 3], [1.0, 0.5]);
        assert_eq!(vertex.uv, [i16::MAX, 16383]);
    }

    #[test]
    fn test_topology_state() {
        assert!(!IndexFormat::TriangleList.render_state().contains(RenderState::TRIANGLE_STRIP));
        assert!(IndexFormat::TriangleStrip.render_state().contains(RenderState::TRIANGLE_STRIP));
        assert!(IndexFormat::TriangleStrip.render_state().contains(RenderState::DEPTH_TEST_LESS));
    }

    #[test]
    fn test_primitive_rejects_out_of_range_indices() {
        let backend = RecordingBackend::new();
        let log = backend.log();
        let mut renderer = Renderer::new(Box::new(backend));
        let vertices = [Vertex::new([0.0; 3], [0, 0]); 3];

        let err = Primitive::new(&mut renderer, IndexFormat::TriangleList, &vertices, &[0, 1, 3], None, Vec4::splat(1.0))
            .unwrap_err();
        assert!(matches!(err, RenderError::ResourceCreationFailure(_)));
        assert_eq!(log.live_resources(), 0);
    }

    #[test]
    fn test_draw_call_uses_fallback_albedo() {
        let mut renderer = Renderer::new(Box::new(RecordingBackend::new()));
        let vertices = [Vertex::new([0.0; 3], [0, 0]); 3];
        let primitive = Primitive::new(
            &mut renderer,
            IndexFormat::TriangleStrip,
            &vertices,
            &[0, 1, 2],
            None,
            Vec4::new(0.5, 0.5, 0.5, 1.0),
        )
        .unwrap();

        let draw = primitive.draw_call(&Mat4::identity(), renderer.textures(), Some(TextureId(7)));
        assert_eq!(draw.albedo, Some(TextureId(7)));
        assert_eq!(draw.base_color, [0.5, 0.5, 0.5, 1.0]);
        assert!(draw.state.contains(RenderState::TRIANGLE_STRIP));
        assert_eq!(draw.transform, Mat4::identity().to_column_major_array());
    }
}

//! Headless backend that records what it is asked to do

use super::backend::{DrawCall, GpuResource, IndexBufferId, RenderBackend, TextureId, VertexBufferId};
use super::{RenderError, RenderResult, TextureImage, Vertex};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

#[derive(Debug, Default)]
struct Recorded {
    vertex_buffers: HashMap<VertexBufferId, usize>,
    index_buffers: HashMap<IndexBufferId, usize>,
    textures: HashMap<TextureId, (u32, u32)>,
    destroyed: Vec<GpuResource>,
    pending_draws: Vec<DrawCall>,
    last_frame: Vec<DrawCall>,
    view_transform: Option<([f32; 16], [f32; 16])>,
    frames: u64,
}

impl Recorded {
    fn live(&self) -> usize {
        self.vertex_buffers.len() + self.index_buffers.len() + self.textures.len()
    }
}

/// Shared view of everything a [`RecordingBackend`] has seen
///
/// Stays readable after the backend has been moved into a
/// [`Renderer`](super::Renderer).
#[derive(Debug, Clone, Default)]
pub struct RecordingLog(Rc<RefCell<Recorded>>);

impl RecordingLog {
    /// Buffers and textures created and not yet destroyed
    pub fn live_resources(&self) -> usize {
        self.0.borrow().live()
    }

    /// Live vertex buffers
    pub fn vertex_buffer_count(&self) -> usize {
        self.0.borrow().vertex_buffers.len()
    }

    /// Live index buffers
    pub fn index_buffer_count(&self) -> usize {
        self.0.borrow().index_buffers.len()
    }

    /// Live textures
    pub fn texture_count(&self) -> usize {
        self.0.borrow().textures.len()
    }

    /// Every destroy call, in order
    pub fn destroyed(&self) -> Vec<GpuResource> {
        self.0.borrow().destroyed.clone()
    }

    /// Draws submitted during the last completed frame
    pub fn last_frame_draws(&self) -> Vec<DrawCall> {
        self.0.borrow().last_frame.clone()
    }

    /// Draws submitted since the last frame ended
    pub fn pending_draws(&self) -> Vec<DrawCall> {
        self.0.borrow().pending_draws.clone()
    }

    /// Most recent view and projection
    pub fn view_transform(&self) -> Option<([f32; 16], [f32; 16])> {
        self.0.borrow().view_transform
    }

    /// Completed frames
    pub fn frame_count(&self) -> u64 {
        self.0.borrow().frames
    }
}

/// Backend with no GPU behind it
pub struct RecordingBackend {
    log: RecordingLog,
    next_id: u32,
    resource_limit: Option<usize>,
    homogeneous_depth: bool,
}

impl Default for RecordingBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingBackend {
    /// Create a backend with `[0, 1]` depth and no resource limit
    pub fn new() -> Self {
        Self {
            log: RecordingLog::default(),
            next_id: 1,
            resource_limit: None,
            homogeneous_depth: false,
        }
    }

    /// Fail creation once `limit` resources are alive
    pub fn with_resource_limit(mut self, limit: usize) -> Self {
        self.resource_limit = Some(limit);
        self
    }

    /// Report `[-1, 1]` clip-space depth
    pub fn with_homogeneous_depth(mut self, homogeneous_depth: bool) -> Self {
        self.homogeneous_depth = homogeneous_depth;
        self
    }

    /// Handle to the recorded state
    pub fn log(&self) -> RecordingLog {
        self.log.clone()
    }

    fn allocate(&mut self, what: &str) -> RenderResult<u32> {
        if let Some(limit) = self.resource_limit {
            if self.log.live_resources() >= limit {
                return Err(RenderError::ResourceCreationFailure(format!(
                    "failed to create {what}: limit of {limit} resources reached"
                )));
            }
        }
        let id = self.next_id;
        self.next_id += 1;
        Ok(id)
    }
}

impl RenderBackend for RecordingBackend {
    fn name(&self) -> &str {
        "recording"
    }

    fn homogeneous_depth(&self) -> bool {
        self.homogeneous_depth
    }

    fn create_vertex_buffer(&mut self, vertices: &[Vertex]) -> RenderResult<VertexBufferId> {
        if vertices.is_empty() {
            return Err(RenderError::ResourceCreationFailure(
                "failed to create vertex buffer: no vertices".to_string(),
            ));
        }
        let id = VertexBufferId(self.allocate("vertex buffer")?);
        self.log.0.borrow_mut().vertex_buffers.insert(id, vertices.len());
        Ok(id)
    }

    fn create_index_buffer(&mut self, indices: &[u16]) -> RenderResult<IndexBufferId> {
        if indices.is_empty() {
            return Err(RenderError::ResourceCreationFailure(
                "failed to create index buffer: no indices".to_string(),
            ));
        }
        let id = IndexBufferId(self.allocate("index buffer")?);
        self.log.0.borrow_mut().index_buffers.insert(id, indices.len());
        Ok(id)
    }

    fn create_texture(&mut self, image: &TextureImage) -> RenderResult<TextureId> {
        let id = TextureId(self.allocate("texture")?);
        self.log
            .0
            .borrow_mut()
            .textures
            .insert(id, (image.width(), image.height()));
        Ok(id)
    }

    fn destroy(&mut self, resource: GpuResource) {
        let mut recorded = self.log.0.borrow_mut();
        let removed = match resource {
            GpuResource::VertexBuffer(id) => recorded.vertex_buffers.remove(&id).is_some(),
            GpuResource::IndexBuffer(id) => recorded.index_buffers.remove(&id).is_some(),
            GpuResource::Texture(id) => recorded.textures.remove(&id).is_some(),
        };
        if removed {
            recorded.destroyed.push(resource);
        }
    }

    fn set_view_transform(&mut self, view: &[f32; 16], projection: &[f32; 16]) {
        self.log.0.borrow_mut().view_transform = Some((*view, *projection));
    }

    fn submit(&mut self, draw: &DrawCall) -> RenderResult<()> {
        let mut recorded = self.log.0.borrow_mut();
        if !recorded.vertex_buffers.contains_key(&draw.vertex_buffer) {
            return Err(RenderError::InvalidHandle(draw.vertex_buffer.into()));
        }
        if !recorded.index_buffers.contains_key(&draw.index_buffer) {
            return Err(RenderError::InvalidHandle(draw.index_buffer.into()));
        }
        if let Some(texture) = draw.albedo {
            if !recorded.textures.contains_key(&texture) {
                return Err(RenderError::InvalidHandle(texture.into()));
            }
        }
        recorded.pending_draws.push(draw.clone());
        Ok(())
    }

    fn frame(&mut self) {
        let mut recorded = self.log.0.borrow_mut();
        let draws = std::mem::take(&mut recorded.pending_draws);
        recorded.last_frame = draws;
        recorded.frames += 1;
    }
}

//! Renderer: backend, texture store and deferred releases

use super::backend::{DrawCall, RenderBackend};
use super::resources::{GpuHandle, IndexBuffer, ReleaseQueue, Texture, VertexBuffer};
use super::{RenderResult, TextureHandle, TextureImage, TextureStore, Vertex};
use crate::foundation::math::Mat4;
use std::path::Path;

/// Per-frame counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Draws submitted this frame
    pub draw_calls: usize,
    /// Resources released at the end of the last frame
    pub released: usize,
    /// Frames completed
    pub frames: u64,
}

/// Owns the backend and everything uploaded through it
pub struct Renderer {
    backend: Box<dyn RenderBackend>,
    textures: TextureStore,
    releases: ReleaseQueue,
    stats: FrameStats,
}

impl Renderer {
    /// Wrap a backend
    pub fn new(backend: Box<dyn RenderBackend>) -> Self {
        log::info!("Renderer using {} backend", backend.name());
        Self {
            backend,
            textures: TextureStore::new(),
            releases: ReleaseQueue::new(),
            stats: FrameStats::default(),
        }
    }

    /// Backend name
    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Whether clip-space depth runs from -1 to 1
    pub fn homogeneous_depth(&self) -> bool {
        self.backend.homogeneous_depth()
    }

    /// Uploaded textures
    pub fn textures(&self) -> &TextureStore {
        &self.textures
    }

    /// Counters for the current frame
    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    /// Upload vertices
    pub fn create_vertex_buffer(&mut self, vertices: &[Vertex]) -> RenderResult<VertexBuffer> {
        let id = self.backend.create_vertex_buffer(vertices)?;
        log::debug!("Created vertex buffer {:?} ({} vertices)", id, vertices.len());
        Ok(GpuHandle::new(id, self.releases.clone()))
    }

    /// Upload indices
    pub fn create_index_buffer(&mut self, indices: &[u16]) -> RenderResult<IndexBuffer> {
        let id = self.backend.create_index_buffer(indices)?;
        log::debug!("Created index buffer {:?} ({} indices)", id, indices.len());
        Ok(GpuHandle::new(id, self.releases.clone()))
    }

    /// Upload an image without registering it in the store
    pub fn create_texture(&mut self, image: &TextureImage) -> RenderResult<Texture> {
        let id = self.backend.create_texture(image)?;
        log::debug!(
            "Created texture {:?} '{}' ({}x{} {:?})",
            id,
            image.name(),
            image.width(),
            image.height(),
            image.format()
        );
        Ok(GpuHandle::new(id, self.releases.clone()))
    }

    /// Upload `image` into the store, reusing an existing texture of the same name
    pub fn add_texture(&mut self, image: &TextureImage) -> RenderResult<TextureHandle> {
        if let Some(handle) = self.textures.find(image.name()) {
            return Ok(handle);
        }
        let texture = self.create_texture(image)?;
        Ok(self.textures.insert(image.name(), texture))
    }

    /// Decode encoded image bytes and add them to the store under `name`
    pub fn load_texture(&mut self, name: &str, bytes: &[u8]) -> RenderResult<TextureHandle> {
        if let Some(handle) = self.textures.find(name) {
            return Ok(handle);
        }
        self.add_texture(&TextureImage::decode(name, bytes)?)
    }

    /// Decode an image file and add it to the store under its path
    pub fn load_texture_file(&mut self, path: impl AsRef<Path>) -> RenderResult<TextureHandle> {
        let path = path.as_ref();
        if let Some(handle) = self.textures.find(&path.display().to_string()) {
            return Ok(handle);
        }
        self.add_texture(&TextureImage::open(path)?)
    }

    /// Set the camera for the following draws
    pub fn set_view_transform(&mut self, view: &Mat4, projection: &Mat4) {
        self.backend
            .set_view_transform(&view.to_column_major_array(), &projection.to_column_major_array());
    }

    /// Submit one draw
    pub fn submit(&mut self, draw: &DrawCall) -> RenderResult<()> {
        self.backend.submit(draw)?;
        self.stats.draw_calls += 1;
        Ok(())
    }

    /// Present the frame and destroy everything released during it
    pub fn end_frame(&mut self) {
        self.backend.frame();
        let released = self.release_pending();
        self.stats = FrameStats {
            draw_calls: 0,
            released,
            frames: self.stats.frames + 1,
        };
    }

    /// Destroy every resource whose handle has been dropped
    pub fn release_pending(&mut self) -> usize {
        let pending = self.releases.drain();
        for &resource in &pending {
            self.backend.destroy(resource);
        }
        if !pending.is_empty() {
            log::debug!("Released {} GPU resources", pending.len());
        }
        pending.len()
    }

    /// Drop every texture and release everything pending
    pub fn shutdown(&mut self) {
        self.textures.clear();
        self.release_pending();
    }
}

impl Drop for Renderer {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::RecordingBackend;

    fn recording_renderer() -> (Renderer, crate::render::RecordingLog) {
        let backend = RecordingBackend::new();
        let log = backend.log();
        (Renderer::new(Box::new(backend)), log)
    }

    #[test]
    fn test_dropped_buffers_are_released_at_frame_end() {
        let (mut renderer, log) = recording_renderer();
        let vertices = [Vertex::new([0.0; 3], [0, 0]); 3];
        let buffer = renderer.create_vertex_buffer(&vertices).unwrap();
        assert_eq!(log.vertex_buffer_count(), 1);

        drop(buffer);
        assert_eq!(log.vertex_buffer_count(), 1);

        renderer.end_frame();
        assert_eq!(log.vertex_buffer_count(), 0);
        assert_eq!(renderer.stats().released, 1);
        assert_eq!(renderer.stats().frames, 1);
    }

    #[test]
    fn test_textures_are_deduplicated() {
        let (mut renderer, log) = recording_renderer();
        let image = TextureImage::solid("white", [255; 4]);
        let a = renderer.add_texture(&image).unwrap();
        let b = renderer.add_texture(&image).unwrap();
        assert_eq!(a, b);
        assert_eq!(log.texture_count(), 1);
    }

    #[test]
    fn test_shutdown_releases_textures() {
        let (mut renderer, log) = recording_renderer();
        renderer.add_texture(&TextureImage::solid("white", [255; 4])).unwrap();
        drop(renderer);
        assert_eq!(log.live_resources(), 0);
    }

    #[test]
    fn test_view_transform_is_column_major() {
        let (mut renderer, log) = recording_renderer();
        let view = Mat4::translation([1.0, 2.0, 3.0].into());
        renderer.set_view_transform(&view, &Mat4::identity());

        let (sent_view, _) = log.view_transform().unwrap();
        assert_eq!(&sent_view[12..15], &[1.0, 2.0, 3.0]);
    }
}

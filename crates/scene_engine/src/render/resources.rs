//! Owned GPU resource handles
//!
//! A [`GpuHandle`] owns one backend resource. Dropping it does not call the
//! backend; it pushes the id onto a shared [`ReleaseQueue`] that the
//! [`Renderer`](super::Renderer) drains at the end of each frame and on
//! shutdown. Components can therefore own GPU data without holding a
//! reference to the renderer.

use super::backend::{GpuResource, IndexBufferId, TextureId, VertexBufferId};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Resources waiting to be destroyed by the backend
#[derive(Debug, Clone, Default)]
pub struct ReleaseQueue(Rc<RefCell<Vec<GpuResource>>>);

impl ReleaseQueue {
    /// Empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `resource` for destruction
    pub fn push(&self, resource: GpuResource) {
        self.0.borrow_mut().push(resource);
    }

    /// Number of pending releases
    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    /// Whether nothing is pending
    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    /// Take every pending release, oldest first
    pub fn drain(&self) -> Vec<GpuResource> {
        std::mem::take(&mut *self.0.borrow_mut())
    }
}

/// Unique owner of one backend resource
pub struct GpuHandle<I: Copy + Into<GpuResource>> {
    id: I,
    queue: ReleaseQueue,
}

/// Owned vertex buffer
pub type VertexBuffer = GpuHandle<VertexBufferId>;

/// Owned index buffer
pub type IndexBuffer = GpuHandle<IndexBufferId>;

/// Owned texture
pub type Texture = GpuHandle<TextureId>;

impl<I: Copy + Into<GpuResource>> GpuHandle<I> {
    pub(crate) fn new(id: I, queue: ReleaseQueue) -> Self {
        Self { id, queue }
    }

    /// Backend id
    pub fn id(&self) -> I {
        self.id
    }
}

impl<I: Copy + Into<GpuResource>> fmt::Debug for GpuHandle<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("GpuHandle").field(&self.id.into()).finish()
    }
}

impl<I: Copy + Into<GpuResource>> Drop for GpuHandle<I> {
    fn drop(&mut self) {
        self.queue.push(self.id.into());
    }
}

//! Renderable mesh component

use super::Transform;
use crate::ecs::{Component, EcsError, Entity, World};
use crate::render::{Mesh, RenderError, RenderResult, Renderer, TextureHandle};
use std::collections::HashMap;
use std::rc::Rc;

/// Texture slots a mesh renderer can bind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureType {
    /// Base color
    Albedo,
}

/// Draws a [`Mesh`] at its entity's world transform
///
/// Requires a [`Transform`]; one is added when missing. The mesh is shared so
/// several nodes can reference the same GPU buffers.
#[derive(Debug)]
pub struct MeshRenderer {
    mesh: Rc<Mesh>,
    textures: HashMap<TextureType, TextureHandle>,
    owner: Option<Entity>,
    visible: bool,
}

impl Component for MeshRenderer {
    fn register_dependencies(world: &mut World, owner: Entity) -> Result<(), EcsError> {
        world.get_or_add_component::<Transform>(owner).map(|_| ())
    }

    fn on_attach(&mut self, owner: Entity) {
        self.owner = Some(owner);
    }
}

impl MeshRenderer {
    /// Renderer for `mesh`
    pub fn new(mesh: Rc<Mesh>) -> Self {
        Self {
            mesh,
            textures: HashMap::new(),
            owner: None,
            visible: true,
        }
    }

    /// The mesh drawn
    pub fn mesh(&self) -> &Rc<Mesh> {
        &self.mesh
    }

    /// Entity this renderer is attached to
    pub fn owner(&self) -> Option<Entity> {
        self.owner
    }

    /// Bind a texture used when a primitive has none of its own
    pub fn add_texture(&mut self, slot: TextureType, texture: TextureHandle) {
        self.textures.insert(slot, texture);
    }

    /// Texture bound to `slot`
    pub fn texture(&self, slot: TextureType) -> Option<TextureHandle> {
        self.textures.get(&slot).copied()
    }

    /// Show or hide
    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Whether [`render`](Self::render) submits anything
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Submit one draw per primitive
    pub fn render(&self, owner: Entity, world: &World, renderer: &mut Renderer) -> RenderResult<()> {
        if !self.visible {
            return Ok(());
        }

        let transform = world
            .get_component::<Transform>(owner)
            .ok_or(RenderError::MissingTransform(owner))?;
        let matrix = transform.transform_matrix(world);
        let fallback_albedo = self
            .texture(TextureType::Albedo)
            .and_then(|handle| renderer.textures().texture_id(handle));

        for primitive in self.mesh.primitives() {
            let draw = primitive.draw_call(&matrix, renderer.textures(), fallback_albedo);
            renderer.submit(&draw)?;
        }
        Ok(())
    }
}

//! Turning a scene description into GPU meshes and entities

use super::description::{MeshDescription, NodeVisit, SceneDescription};
use super::AssetResult;
use crate::core::AssetConfig;
use crate::ecs::components::{MeshRenderer, TextureType};
use crate::ecs::{hierarchy, Entity, World};
use crate::render::{Mesh, Primitive, Renderer, TextureHandle};
use crate::scene::Scene;
use std::path::PathBuf;
use std::rc::Rc;

/// Loader settings that do not come from the file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoaderOptions {
    /// Image bound as albedo on every imported mesh renderer
    pub fallback_albedo: Option<PathBuf>,
}

impl LoaderOptions {
    /// No fallback texture
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind the image at `path` to primitives without their own texture
    pub fn with_fallback_albedo(mut self, path: impl Into<PathBuf>) -> Self {
        self.fallback_albedo = Some(path.into());
        self
    }

    /// Options taken from the asset section of the engine config
    pub fn from_config(config: &AssetConfig) -> Self {
        Self {
            fallback_albedo: config.fallback_albedo.as_ref().map(PathBuf::from),
        }
    }
}

/// Entities created by one load
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadedScene {
    /// Top-level entities, in scene order
    pub roots: Vec<Entity>,
    /// Every created entity, parents before children
    pub entities: Vec<Entity>,
}

impl LoadedScene {
    /// Number of entities created
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Whether the load created nothing
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

/// Validate `description`, upload its meshes and create one entity per node
///
/// Nothing is added to the scene unless every step succeeds. GPU buffers
/// created before a failure are dropped and released by the renderer at the
/// end of the frame.
pub fn populate_scene(
    scene: &mut Scene,
    description: &SceneDescription,
    renderer: &mut Renderer,
    options: &LoaderOptions,
) -> AssetResult<LoadedScene> {
    let visits = description.validate()?;

    let fallback_albedo = options
        .fallback_albedo
        .as_ref()
        .map(|path| renderer.load_texture_file(path))
        .transpose()?;

    let images = description
        .images
        .iter()
        .map(|image| renderer.add_texture(image))
        .collect::<Result<Vec<_>, _>>()?;

    let meshes = description
        .meshes
        .iter()
        .map(|mesh| build_mesh(renderer, mesh, &images))
        .collect::<AssetResult<Vec<_>>>()?;

    let world = scene.world_mut();
    let mut loaded = LoadedScene::default();
    let result = instantiate(world, description, &visits, &meshes, fallback_albedo, &mut loaded);

    if let Err(err) = result {
        for &entity in loaded.entities.iter().rev() {
            if world.is_alive(entity) {
                let _ = world.destroy_entity(entity);
            }
        }
        return Err(err);
    }

    log::info!(
        "Imported {} entities ({} roots, {} meshes, {} images)",
        loaded.len(),
        loaded.roots.len(),
        meshes.len(),
        images.len()
    );
    Ok(loaded)
}

fn build_mesh(
    renderer: &mut Renderer,
    description: &MeshDescription,
    images: &[TextureHandle],
) -> AssetResult<Rc<Mesh>> {
    let mut primitives = Vec::with_capacity(description.primitives.len());
    for primitive in &description.primitives {
        primitives.push(Primitive::new(
            renderer,
            primitive.topology,
            &primitive.vertices,
            &primitive.indices,
            primitive.albedo.and_then(|image| images.get(image).copied()),
            primitive.base_color_factor,
        )?);
    }
    log::debug!(
        "Built mesh '{}' with {} primitives",
        description.name.as_deref().unwrap_or("<unnamed>"),
        primitives.len()
    );
    Ok(Rc::new(Mesh::new(primitives)))
}

fn instantiate(
    world: &mut World,
    description: &SceneDescription,
    visits: &[NodeVisit],
    meshes: &[Rc<Mesh>],
    fallback_albedo: Option<TextureHandle>,
    loaded: &mut LoadedScene,
) -> AssetResult<()> {
    let mut created: Vec<Option<Entity>> = vec![None; description.nodes.len()];

    for visit in visits {
        let Some(node) = description.nodes.get(visit.node) else {
            continue;
        };
        let entity = world.create_entity();
        loaded.entities.push(entity);
        log::trace!("Importing node {} '{}' as {}", visit.node, node.display_name(), entity);

        world.add_component(entity, node.transform())?;

        match visit.parent.and_then(|parent| created.get(parent).copied().flatten()) {
            Some(parent) => hierarchy::set_parent(world, entity, parent)?,
            None => loaded.roots.push(entity),
        }

        if let Some(mesh) = node.mesh.and_then(|mesh| meshes.get(mesh)) {
            let mut renderer = MeshRenderer::new(Rc::clone(mesh));
            if let Some(texture) = fallback_albedo {
                renderer.add_texture(TextureType::Albedo, texture);
            }
            world.add_component(entity, renderer)?;
        }

        if let Some(slot) = created.get_mut(visit.node) {
            *slot = Some(entity);
        }
    }
    Ok(())
}

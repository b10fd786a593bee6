//! glTF 2.0 reader
//!
//! Reads `.gltf`/`.glb` files with the `gltf` crate and converts the
//! selected scene into a [`SceneDescription`]. Only what the renderer can draw
//! is accepted: indexed triangle lists or strips with `POSITION` and
//! `TEXCOORD_0`, 8 or 16-bit indices, and 8-bit images.

use super::description::{MeshDescription, NodeDescription, PrimitiveDescription, SceneDescription};
use super::populate::{populate_scene, LoadedScene, LoaderOptions};
use super::{AssetError, AssetResult};
use crate::foundation::math::{Quaternion, Vec3, Vec4};
use crate::render::{IndexFormat, Renderer, TextureFormat, TextureImage, Vertex};
use crate::scene::Scene;
use gltf::mesh::util::ReadIndices;
use gltf::mesh::Mode;
use gltf::Semantic;
use std::path::Path;

/// Load the default scene of a glTF file into `scene`
pub fn load_scene(
    scene: &mut Scene,
    path: impl AsRef<Path>,
    renderer: &mut Renderer,
) -> AssetResult<LoadedScene> {
    load_scene_with(scene, path, renderer, &LoaderOptions::default())
}

/// [`load_scene`] with explicit loader options
pub fn load_scene_with(
    scene: &mut Scene,
    path: impl AsRef<Path>,
    renderer: &mut Renderer,
    options: &LoaderOptions,
) -> AssetResult<LoadedScene> {
    let path = path.as_ref();
    log::info!("Loading scene from {}", path.display());
    let description = describe_gltf_file(path)?;
    populate_scene(scene, &description, renderer, options)
}

/// Read a glTF file, resolving external buffers and images next to it
pub fn describe_gltf_file(path: impl AsRef<Path>) -> AssetResult<SceneDescription> {
    let path = path.as_ref();
    let (document, buffers, images) = gltf::import(path).map_err(import_error)?;
    describe_document(&document, &buffers, &images, &path.display().to_string())
}

/// Read a self-contained glTF or GLB held in memory
///
/// `source` names the document in texture names and log messages.
pub fn describe_gltf_slice(bytes: &[u8], source: &str) -> AssetResult<SceneDescription> {
    let (document, buffers, images) = gltf::import_slice(bytes).map_err(import_error)?;
    describe_document(&document, &buffers, &images, source)
}

fn import_error(err: gltf::Error) -> AssetError {
    match err {
        gltf::Error::Io(err) => AssetError::Io(err),
        other => AssetError::Parse(other.to_string()),
    }
}

fn describe_document(
    document: &gltf::Document,
    buffers: &[gltf::buffer::Data],
    images: &[gltf::image::Data],
    source: &str,
) -> AssetResult<SceneDescription> {
    let scene = document
        .default_scene()
        .or_else(|| document.scenes().next())
        .ok_or_else(|| AssetError::Malformed(format!("{source} contains no scene")))?;

    let images = document
        .images()
        .zip(images)
        .map(|(image, data)| {
            let name = match image.name() {
                Some(name) => format!("{source}#{name}"),
                None => format!("{source}#image{}", image.index()),
            };
            describe_image(name, data)
        })
        .collect::<AssetResult<Vec<_>>>()?;

    let meshes = document
        .meshes()
        .map(|mesh| describe_mesh(&mesh, buffers))
        .collect::<AssetResult<Vec<_>>>()?;

    let nodes = document.nodes().map(|node| describe_node(&node)).collect();
    let roots = scene.nodes().map(|node| node.index()).collect();

    log::debug!(
        "{}: scene {} with {} nodes, {} meshes, {} images",
        source,
        scene.index(),
        document.nodes().len(),
        meshes.len(),
        images.len()
    );

    Ok(SceneDescription {
        nodes,
        roots,
        meshes,
        images,
    })
}

fn describe_node(node: &gltf::Node) -> NodeDescription {
    let (translation, rotation, scale) = node.transform().decomposed();
    NodeDescription {
        name: node.name().map(str::to_owned),
        translation: Vec3::from(translation),
        rotation: Quaternion::from(rotation),
        scale: Vec3::from(scale),
        mesh: node.mesh().map(|mesh| mesh.index()),
        children: node.children().map(|child| child.index()).collect(),
    }
}

fn describe_mesh(mesh: &gltf::Mesh, buffers: &[gltf::buffer::Data]) -> AssetResult<MeshDescription> {
    let mut primitives = Vec::new();
    for primitive in mesh.primitives() {
        if let Some(description) = describe_primitive(mesh.index(), &primitive, buffers)? {
            primitives.push(description);
        }
    }
    Ok(MeshDescription {
        name: mesh.name().map(str::to_owned),
        primitives,
    })
}

/// `None` when a vertex accessor has no buffer view to read from
fn describe_primitive(
    mesh: usize,
    primitive: &gltf::Primitive,
    buffers: &[gltf::buffer::Data],
) -> AssetResult<Option<PrimitiveDescription>> {
    let index = primitive.index();
    let missing = |attribute| AssetError::MissingAttribute {
        mesh,
        primitive: index,
        attribute,
    };

    let topology = match primitive.mode() {
        Mode::Triangles => IndexFormat::TriangleList,
        Mode::TriangleStrip => IndexFormat::TriangleStrip,
        other => return Err(AssetError::UnsupportedTopology(format!("{other:?}"))),
    };

    let positions = primitive.get(&Semantic::Positions).ok_or_else(|| missing("POSITION"))?;
    let tex_coords = primitive.get(&Semantic::TexCoords(0)).ok_or_else(|| missing("TEXCOORD_0"))?;
    let indices = primitive
        .indices()
        .ok_or(AssetError::MissingIndices { mesh, primitive: index })?;

    if indices.view().is_none() {
        return Err(AssetError::Malformed(format!(
            "index accessor of primitive {index} in mesh {mesh} has no buffer view"
        )));
    }
    if [&positions, &tex_coords].iter().any(|accessor| accessor.view().is_none()) {
        log::warn!("Skipping primitive {} of mesh {}: vertex accessor without buffer view", index, mesh);
        return Ok(None);
    }

    let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|data| data.0.as_slice()));

    let indices: Vec<u16> = match reader
        .read_indices()
        .ok_or(AssetError::MissingIndices { mesh, primitive: index })?
    {
        ReadIndices::U8(iter) => iter.map(u16::from).collect(),
        ReadIndices::U16(iter) => iter.collect(),
        ReadIndices::U32(_) => return Err(AssetError::UnsupportedIndexType("U32".to_string())),
    };

    let positions: Vec<[f32; 3]> = reader.read_positions().ok_or_else(|| missing("POSITION"))?.collect();
    let tex_coords: Vec<[f32; 2]> = reader
        .read_tex_coords(0)
        .ok_or_else(|| missing("TEXCOORD_0"))?
        .into_f32()
        .collect();

    if positions.len() != tex_coords.len() {
        return Err(AssetError::Malformed(format!(
            "primitive {index} of mesh {mesh} has {} positions but {} texture coordinates",
            positions.len(),
            tex_coords.len()
        )));
    }

    let vertices = positions
        .into_iter()
        .zip(tex_coords)
        .map(|(position, uv)| Vertex::with_float_uv(position, uv))
        .collect();

    let pbr = primitive.material().pbr_metallic_roughness();
    Ok(Some(PrimitiveDescription {
        topology,
        vertices,
        indices,
        base_color_factor: Vec4::from(pbr.base_color_factor()),
        albedo: pbr.base_color_texture().map(|info| info.texture().source().index()),
    }))
}

fn describe_image(name: String, data: &gltf::image::Data) -> AssetResult<TextureImage> {
    let format = match data.format {
        gltf::image::Format::R8 => TextureFormat::R8,
        gltf::image::Format::R8G8 => TextureFormat::Rg8,
        gltf::image::Format::R8G8B8 => TextureFormat::Rgb8,
        gltf::image::Format::R8G8B8A8 => TextureFormat::Rgba8,
        other => {
            return Err(AssetError::UnsupportedTextureFormat(format!("'{name}' uses {other:?}")));
        }
    };
    Ok(TextureImage::new(name, data.width, data.height, format, data.pixels.clone())?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::components::{MeshRenderer, Transform};
    use crate::ecs::hierarchy;
    use crate::render::RecordingBackend;
    use approx::assert_relative_eq;
    use std::path::PathBuf;

    fn fixture(name: &str) -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name)
    }

    #[test]
    fn test_two_node_scene() {
        let backend = RecordingBackend::new();
        let log = backend.log();
        let mut renderer = Renderer::new(Box::new(backend));
        let mut scene = Scene::new();

        let loaded = load_scene(&mut scene, fixture("two_nodes.gltf"), &mut renderer).unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(scene.world().entity_count(), 2);

        let world = scene.world();
        let (root, child) = (loaded.entities[0], loaded.entities[1]);
        assert_eq!(loaded.roots, vec![root]);
        assert_eq!(hierarchy::get_parent(world, child), Some(root));
        assert_eq!(hierarchy::children(world, root), vec![child]);

        let root_transform = world.get_component::<Transform>(root).unwrap();
        assert_eq!(root_transform.position(), Vec3::new(1.0, 2.0, 3.0));
        assert!(!world.has_component::<MeshRenderer>(root));

        let transform = world.get_component::<Transform>(child).unwrap();
        assert_eq!(transform.position(), Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(transform.scale(), Vec3::new(2.0, 2.0, 2.0));
        assert_relative_eq!(transform.rotation(), Quaternion::new(0.0, 0.707_106_8, 0.0, 0.707_106_8));
        assert_relative_eq!(transform.world_position(world), Vec3::new(1.0, 3.0, 3.0));

        let mesh = world.get_component::<MeshRenderer>(child).unwrap().mesh();
        assert_eq!(mesh.len(), 1);
        assert_eq!(mesh.primitives()[0].vertex_count(), 3);
        assert_eq!(mesh.primitives()[0].index_count(), 3);
        assert_eq!(log.live_resources(), 2);
    }

    #[test]
    fn test_vertices_carry_quantised_uvs() {
        let description = describe_gltf_file(fixture("two_nodes.gltf")).unwrap();
        let primitive = &description.meshes[0].primitives[0];
        assert_eq!(primitive.topology, IndexFormat::TriangleList);
        assert_eq!(primitive.indices, vec![0, 1, 2]);
        assert_eq!(primitive.vertices[1], Vertex::new([1.0, 0.0, 0.0], [i16::MAX, 0]));
        assert_eq!(primitive.vertices[2].uv, [0, i16::MAX]);
        assert_eq!(primitive.base_color_factor, Vec4::splat(1.0));
        assert_eq!(description.nodes[1].name.as_deref(), Some("Child"));
    }

    #[test]
    fn test_describe_from_memory() {
        let bytes = std::fs::read(fixture("two_nodes.gltf")).unwrap();
        let description = describe_gltf_slice(&bytes, "memory").unwrap();
        assert_eq!(description.roots, vec![0]);
        assert_eq!(description.nodes[0].children, vec![1]);
        assert_eq!(description.nodes[1].mesh, Some(0));
    }

    #[test]
    fn test_embedded_texture_and_base_color() {
        let description = describe_gltf_file(fixture("textured.gltf")).unwrap();
        assert_eq!(description.images.len(), 1);

        let image = &description.images[0];
        assert_eq!((image.width(), image.height()), (2, 2));
        assert_eq!(image.format(), TextureFormat::Rgba8);
        assert_eq!(&image.pixels()[..4], &[255, 0, 0, 255]);

        let primitive = &description.meshes[0].primitives[0];
        assert_eq!(primitive.albedo, Some(0));
        assert_eq!(primitive.base_color_factor, Vec4::new(1.0, 0.5, 0.25, 1.0));
    }

    #[test]
    fn test_u32_indices_fail_without_side_effects() {
        let backend = RecordingBackend::new();
        let log = backend.log();
        let mut renderer = Renderer::new(Box::new(backend));
        let mut scene = Scene::new();

        let err = load_scene(&mut scene, fixture("u32_indices.gltf"), &mut renderer).unwrap_err();
        assert!(matches!(err, AssetError::UnsupportedIndexType(_)));
        assert_eq!(scene.world().entity_count(), 0);
        assert_eq!(log.live_resources(), 0);
    }

    #[test]
    fn test_missing_texcoord_is_rejected() {
        let err = describe_gltf_file(fixture("missing_texcoord.gltf")).unwrap_err();
        assert!(matches!(
            err,
            AssetError::MissingAttribute { mesh: 0, primitive: 0, attribute: "TEXCOORD_0" }
        ));
    }

    #[test]
    fn test_index_accessor_without_view_is_malformed() {
        let err = describe_gltf_file(fixture("indices_without_view.gltf")).unwrap_err();
        assert!(matches!(err, AssetError::Malformed(_)));
    }

    #[test]
    fn test_point_topology_is_rejected() {
        let err = describe_gltf_file(fixture("points.gltf")).unwrap_err();
        assert!(matches!(err, AssetError::UnsupportedTopology(_)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = describe_gltf_file(fixture("nope.gltf")).unwrap_err();
        assert!(matches!(err, AssetError::Io(_)));
    }

    #[test]
    fn test_garbage_is_parse_error() {
        let err = describe_gltf_slice(b"not a gltf document", "garbage").unwrap_err();
        assert!(matches!(err, AssetError::Parse(_)));
    }
}

//! Scene content loading
//!
//! Loading is split in two steps. A format reader turns a file into a
//! [`SceneDescription`], plain data with no GPU or entity side effects. Then
//! [`populate_scene`] validates the description as a whole and only afterwards
//! uploads meshes and creates entities, so a malformed file never leaves a
//! partially built scene behind.
//!
//! glTF 2.0 is the only reader: see [`load_scene`].

pub mod description;
pub mod populate;
pub mod gltf_loader;

pub use description::{
    MeshDescription, NodeDescription, PrimitiveDescription, SceneDescription,
};
pub use gltf_loader::{describe_gltf_file, describe_gltf_slice, load_scene, load_scene_with};
pub use populate::{populate_scene, LoadedScene, LoaderOptions};

use crate::ecs::EcsError;
use crate::render::RenderError;
use thiserror::Error;

/// Asset loading errors
///
/// Every variant aborts the whole load.
#[derive(Error, Debug)]
pub enum AssetError {
    /// The file is not a valid document of its format
    #[error("Parse error: {0}")]
    Parse(String),

    /// A primitive lacks a vertex attribute the engine needs
    #[error("Primitive {primitive} of mesh {mesh} has no {attribute} attribute")]
    MissingAttribute {
        /// Mesh index
        mesh: usize,
        /// Primitive index within the mesh
        primitive: usize,
        /// Attribute name
        attribute: &'static str,
    },

    /// A primitive is not indexed
    #[error("Primitive {primitive} of mesh {mesh} has no indices")]
    MissingIndices {
        /// Mesh index
        mesh: usize,
        /// Primitive index within the mesh
        primitive: usize,
    },

    /// Indices are stored with a component type wider than 16 bits
    #[error("Unsupported index component type: {0}")]
    UnsupportedIndexType(String),

    /// The primitive is not made of triangles
    #[error("Unsupported primitive topology: {0}")]
    UnsupportedTopology(String),

    /// An embedded image uses a pixel layout textures cannot hold
    #[error("Unsupported texture format: {0}")]
    UnsupportedTextureFormat(String),

    /// References inside the document are inconsistent
    #[error("Malformed scene: {0}")]
    Malformed(String),

    /// Reading the file failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Image decoding failed
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// Entity creation failed
    #[error("Entity error: {0}")]
    Ecs(#[from] EcsError),

    /// GPU resource creation failed
    #[error("Render error: {0}")]
    Render(#[from] RenderError),
}

/// Result type for asset loading
pub type AssetResult<T> = Result<T, AssetError>;

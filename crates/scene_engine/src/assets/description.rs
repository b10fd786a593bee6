//! Format-independent scene description

use super::{AssetError, AssetResult};
use crate::ecs::components::Transform;
use crate::foundation::math::{Quaternion, Vec3, Vec4};
use crate::render::{IndexFormat, TextureImage, Vertex};
use std::collections::HashSet;

/// Geometry and material of one draw
#[derive(Debug, Clone, PartialEq)]
pub struct PrimitiveDescription {
    /// How indices form triangles
    pub topology: IndexFormat,
    /// Vertex data
    pub vertices: Vec<Vertex>,
    /// Indices into `vertices`
    pub indices: Vec<u16>,
    /// Material base color
    pub base_color_factor: Vec4,
    /// Index into [`SceneDescription::images`] of the base color texture
    pub albedo: Option<usize>,
}

impl PrimitiveDescription {
    /// Triangle list with a white material and no texture
    pub fn new(vertices: Vec<Vertex>, indices: Vec<u16>) -> Self {
        Self {
            topology: IndexFormat::TriangleList,
            vertices,
            indices,
            base_color_factor: Vec4::splat(1.0),
            albedo: None,
        }
    }
}

/// A named list of primitives
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MeshDescription {
    /// Mesh name, if the file gives one
    pub name: Option<String>,
    /// Primitives in file order
    pub primitives: Vec<PrimitiveDescription>,
}

/// One node: a local TRS, an optional mesh and its children
#[derive(Debug, Clone, PartialEq)]
pub struct NodeDescription {
    /// Node name, if the file gives one
    pub name: Option<String>,
    /// Local translation
    pub translation: Vec3,
    /// Local rotation
    pub rotation: Quaternion,
    /// Local scale
    pub scale: Vec3,
    /// Index into [`SceneDescription::meshes`]
    pub mesh: Option<usize>,
    /// Indices into [`SceneDescription::nodes`]
    pub children: Vec<usize>,
}

impl Default for NodeDescription {
    fn default() -> Self {
        Self {
            name: None,
            translation: Vec3::zeros(),
            rotation: Quaternion::IDENTITY,
            scale: Vec3::splat(1.0),
            mesh: None,
            children: Vec::new(),
        }
    }
}

impl NodeDescription {
    /// Transform holding this node's local TRS
    pub fn transform(&self) -> Transform {
        Transform::from_trs(self.translation, self.rotation, self.scale)
    }

    /// Name for log messages
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("<unnamed>")
    }
}

/// A node reached while walking the hierarchy from the roots
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeVisit {
    /// Node index
    pub node: usize,
    /// Parent node index, `None` for roots
    pub parent: Option<usize>,
}

/// Everything a loader read from a file
#[derive(Debug, Clone, Default)]
pub struct SceneDescription {
    /// All nodes of the document
    pub nodes: Vec<NodeDescription>,
    /// Nodes at the top of the selected scene
    pub roots: Vec<usize>,
    /// Meshes referenced by nodes
    pub meshes: Vec<MeshDescription>,
    /// Images referenced by primitives
    pub images: Vec<TextureImage>,
}

impl SceneDescription {
    /// Empty description
    pub fn new() -> Self {
        Self::default()
    }

    /// Check every reference and return the nodes to instantiate
    ///
    /// Visits come in depth-first order from the roots, so a parent always
    /// precedes its children. Nodes not reachable from a root are left out.
    /// Fails when a node is reachable twice, which covers both cycles and
    /// nodes listed as the child of more than one parent.
    pub fn validate(&self) -> AssetResult<Vec<NodeVisit>> {
        for (mesh_index, mesh) in self.meshes.iter().enumerate() {
            for (primitive_index, primitive) in mesh.primitives.iter().enumerate() {
                self.validate_primitive(mesh_index, primitive_index, primitive)?;
            }
        }

        for (index, node) in self.nodes.iter().enumerate() {
            if let Some(mesh) = node.mesh {
                if mesh >= self.meshes.len() {
                    return Err(AssetError::Malformed(format!(
                        "node {index} references missing mesh {mesh}"
                    )));
                }
            }
            if let Some(&child) = node.children.iter().find(|&&child| child >= self.nodes.len()) {
                return Err(AssetError::Malformed(format!(
                    "node {index} references missing child {child}"
                )));
            }
        }

        let mut visits = Vec::with_capacity(self.nodes.len());
        let mut seen = HashSet::new();
        let mut stack: Vec<NodeVisit> = self
            .roots
            .iter()
            .rev()
            .map(|&node| NodeVisit { node, parent: None })
            .collect();

        while let Some(visit) = stack.pop() {
            let node = self.nodes.get(visit.node).ok_or_else(|| {
                AssetError::Malformed(format!("scene references missing node {}", visit.node))
            })?;
            if !seen.insert(visit.node) {
                return Err(AssetError::Malformed(format!(
                    "node {} is reachable more than once",
                    visit.node
                )));
            }
            visits.push(visit);
            stack.extend(node.children.iter().rev().map(|&child| NodeVisit {
                node: child,
                parent: Some(visit.node),
            }));
        }

        Ok(visits)
    }

    fn validate_primitive(
        &self,
        mesh: usize,
        primitive: usize,
        description: &PrimitiveDescription,
    ) -> AssetResult<()> {
        if description.vertices.is_empty() || description.indices.is_empty() {
            return Err(AssetError::Malformed(format!(
                "primitive {primitive} of mesh {mesh} is empty"
            )));
        }
        let vertex_count = description.vertices.len();
        if let Some(&bad) = description
            .indices
            .iter()
            .find(|&&index| usize::from(index) >= vertex_count)
        {
            return Err(AssetError::Malformed(format!(
                "primitive {primitive} of mesh {mesh} indexes vertex {bad} of {vertex_count}"
            )));
        }
        if let Some(image) = description.albedo {
            if image >= self.images.len() {
                return Err(AssetError::Malformed(format!(
                    "primitive {primitive} of mesh {mesh} references missing image {image}"
                )));
            }
        }
        Ok(())
    }
}

//! The flattened scene graph.

use glam::{Mat4, Vec3};
use glint_core::{CameraIndex, MaterialIndex, MeshIndex, Mode, NodeIndex, SceneIndex, SkinIndex};

use crate::transform::Transform;

/// Position of a [`GraphNode`] in [`SceneGraph::nodes`].
pub type GraphNodeId = usize;

/// One instance of a document node in the ownership tree.
///
/// A node shared by two parents appears twice, once under each.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphNode {
    /// The document node this instance was built from.
    pub source: NodeIndex,
    pub name: Option<String>,
    pub transform: Transform,
    /// Local matrix as declared, before decomposition.
    pub local: Mat4,
    pub world: Mat4,
    pub parent: Option<GraphNodeId>,
    pub children: Vec<GraphNodeId>,
    pub mesh: Option<MeshBinding>,
    pub skin: Option<SkinIndex>,
    pub camera: Option<CameraIndex>,
}

/// The mesh drawn at a node, with per-primitive draw state.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshBinding {
    pub mesh: MeshIndex,
    pub primitives: Vec<PrimitiveBinding>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrimitiveBinding {
    /// Index within the mesh's `primitives`.
    pub index: usize,
    pub material: Option<MaterialIndex>,
    pub mode: Mode,
}

/// A scene's node hierarchy with resolved world transforms.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneGraph {
    /// The scene the graph was built from.
    pub scene: SceneIndex,
    pub name: Option<String>,
    /// Instances in depth-first pre-order.
    pub nodes: Vec<GraphNode>,
    pub roots: Vec<GraphNodeId>,
}

impl SceneGraph {
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: GraphNodeId) -> Option<&GraphNode> {
        self.nodes.get(id)
    }

    /// Depth-first pre-order walk from each root, children in order.
    pub fn traverse(&self) -> Traverse<'_> {
        Traverse::new(self)
    }

    /// World-space origin of a node.
    pub fn world_position(&self, id: GraphNodeId) -> Option<Vec3> {
        self.node(id).map(|node| node.world.w_axis.truncate())
    }

    /// Nodes that draw a mesh, in traversal order.
    pub fn mesh_instances(&self) -> impl Iterator<Item = (GraphNodeId, &GraphNode, &MeshBinding)> {
        self.traverse()
            .filter_map(|(id, node)| node.mesh.as_ref().map(|mesh| (id, node, mesh)))
    }

    /// First node named `name` in traversal order.
    pub fn find_by_name(&self, name: &str) -> Option<GraphNodeId> {
        self.traverse()
            .find(|(_, node)| node.name.as_deref() == Some(name))
            .map(|(id, _)| id)
    }

    /// The graph node built from document node `source`, if the scene reaches it.
    pub fn find_source(&self, source: NodeIndex) -> Option<GraphNodeId> {
        self.nodes.iter().position(|node| node.source == source)
    }

    /// Number of ancestors of `id`.
    pub fn depth(&self, id: GraphNodeId) -> usize {
        let mut depth = 0;
        let mut current = self.node(id).and_then(|n| n.parent);
        while let Some(parent) = current {
            depth += 1;
            current = self.nodes[parent].parent;
        }
        depth
    }
}

/// Iterator returned by [`SceneGraph::traverse`].
pub struct Traverse<'a> {
    graph: &'a SceneGraph,
    stack: Vec<GraphNodeId>,
}

impl<'a> Traverse<'a> {
    fn new(graph: &'a SceneGraph) -> Self {
        let stack = graph.roots.iter().rev().copied().collect();
        Self { graph, stack }
    }
}

impl<'a> Iterator for Traverse<'a> {
    type Item = (GraphNodeId, &'a GraphNode);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        let node = &self.graph.nodes[id];

        // Reversed so children come out left to right
        self.stack.extend(node.children.iter().rev());

        Some((id, node))
    }
}

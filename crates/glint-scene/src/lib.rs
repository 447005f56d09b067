//! Scene graphs for glint documents.
//!
//! [`build_scene_graph`] walks a scene's node hierarchy and produces a
//! [`SceneGraph`]: an ownership tree of node instances with local and world
//! transforms and mesh bindings. Matrices are decomposed into [`Transform`]s.

pub mod builder;
pub mod graph;
pub mod transform;

pub use builder::build_scene_graph;
pub use graph::{GraphNode, GraphNodeId, MeshBinding, PrimitiveBinding, SceneGraph, Traverse};
pub use transform::Transform;

//! Building a [`SceneGraph`] from a document.

use glam::Mat4;
use glint_core::{Document, GltfError, Node, NodeIndex, Result, SceneIndex};

use crate::graph::{GraphNode, GraphNodeId, MeshBinding, PrimitiveBinding, SceneGraph};
use crate::transform::Transform;

enum Visit {
    Enter {
        node: NodeIndex,
        parent: Option<GraphNodeId>,
    },
    Exit(NodeIndex),
}

/// Build the node hierarchy of one scene.
///
/// `scene` picks the scene when it is in range; otherwise the document's
/// default scene is used, then scene 0. Nodes reachable from themselves
/// fail with [`GltfError::CyclicNodeGraph`]; a node reached through a second
/// parent or listed twice fails with [`GltfError::SchemaViolation`], so every
/// source node appears at most once in the graph.
pub fn build_scene_graph(document: &Document, scene: Option<SceneIndex>) -> Result<SceneGraph> {
    let scene_index = pick_scene(document, scene)?;
    let scene = document.require(scene_index, "scene request")?;

    let mut graph = SceneGraph {
        scene: scene_index,
        name: scene.name.clone(),
        nodes: Vec::new(),
        roots: Vec::new(),
    };
    let mut on_path = vec![false; document.nodes.len()];
    let mut placed = vec![false; document.nodes.len()];
    let mut path: Vec<usize> = Vec::new();
    let mut stack = Vec::new();

    for &root in &scene.nodes {
        stack.push(Visit::Enter {
            node: root,
            parent: None,
        });

        while let Some(visit) = stack.pop() {
            let (index, parent) = match visit {
                Visit::Enter { node, parent } => (node, parent),
                Visit::Exit(node) => {
                    on_path[node.value()] = false;
                    path.pop();
                    continue;
                }
            };

            let referrer = match parent {
                Some(p) => format!("nodes[{}]", graph.nodes[p].source.value()),
                None => format!("scenes[{}]", scene_index.value()),
            };
            let node = document.require(index, &referrer)?;
            let n = index.value();
            path.push(n);
            if on_path[n] {
                return Err(GltfError::CyclicNodeGraph { path });
            }
            if placed[n] {
                return Err(GltfError::schema(format!(
                    "nodes[{}] is reached again from {}; a node may have only one parent",
                    n, referrer
                )));
            }
            on_path[n] = true;
            placed[n] = true;

            let id = graph.nodes.len();
            let parent_world = parent.map_or(Mat4::IDENTITY, |p| graph.nodes[p].world);
            graph.nodes.push(instance(document, index, node, parent, parent_world));
            match parent {
                Some(p) => graph.nodes[p].children.push(id),
                None => graph.roots.push(id),
            }

            stack.push(Visit::Exit(index));
            for &child in node.children.iter().rev() {
                stack.push(Visit::Enter {
                    node: child,
                    parent: Some(id),
                });
            }
        }
    }

    log::debug!(
        "built scene {} with {} node instances from {} roots",
        scene_index.value(),
        graph.nodes.len(),
        graph.roots.len()
    );
    Ok(graph)
}

fn pick_scene(document: &Document, requested: Option<SceneIndex>) -> Result<SceneIndex> {
    if document.scenes.is_empty() {
        return Err(GltfError::NoScene);
    }
    if let Some(index) = requested {
        if document.get(index).is_some() {
            return Ok(index);
        }
        log::warn!(
            "scene {} requested but the document has {}; using the default",
            index.value(),
            document.scenes.len()
        );
    }
    document.default_scene_index().ok_or(GltfError::NoScene)
}

fn instance(
    document: &Document,
    index: NodeIndex,
    node: &Node,
    parent: Option<GraphNodeId>,
    parent_world: Mat4,
) -> GraphNode {
    let transform = Transform::from_node(node);
    let local = match &node.matrix {
        Some(matrix) => Mat4::from_cols_array(matrix),
        None => transform.to_matrix(),
    };
    let mesh = node.mesh.and_then(|mesh| {
        document.get(mesh).map(|m| MeshBinding {
            mesh,
            primitives: m
                .primitives
                .iter()
                .enumerate()
                .map(|(i, p)| PrimitiveBinding {
                    index: i,
                    material: p.material,
                    mode: p.mode,
                })
                .collect(),
        })
    });

    GraphNode {
        source: index,
        name: node.name.clone(),
        transform,
        local,
        world: parent_world * local,
        parent,
        children: Vec::new(),
        mesh,
        skin: node.skin,
        camera: node.camera,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use serde_json::{json, Value};

    fn document(value: Value) -> Document {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_child_world_position() {
        let doc = document(json!({
            "asset": {"version": "2.0"},
            "scenes": [{"nodes": [0]}],
            "nodes": [
                {"name": "parent", "translation": [1, 0, 0], "children": [1]},
                {"name": "child", "translation": [0, 1, 0]}
            ]
        }));
        let graph = build_scene_graph(&doc, None).unwrap();
        let child = graph.find_by_name("child").unwrap();
        assert_eq!(graph.world_position(child), Some(Vec3::new(1.0, 1.0, 0.0)));
        assert_eq!(graph.node(child).unwrap().parent, Some(0));
        assert_eq!(graph.depth(child), 1);
        assert_eq!(graph.find_source(NodeIndex::new(1)), Some(child));
    }

    #[test]
    fn test_cycle() {
        let doc = document(json!({
            "asset": {"version": "2.0"},
            "scenes": [{"nodes": [0]}],
            "nodes": [{"children": [1]}, {"children": [0]}]
        }));
        let err = build_scene_graph(&doc, None).unwrap_err();
        assert_eq!(err, GltfError::CyclicNodeGraph { path: vec![0, 1, 0] });
    }

    #[test]
    fn test_self_cycle() {
        let doc = document(json!({
            "asset": {"version": "2.0"},
            "scenes": [{"nodes": [0]}],
            "nodes": [{"children": [0]}]
        }));
        assert!(matches!(
            build_scene_graph(&doc, None),
            Err(GltfError::CyclicNodeGraph { .. })
        ));
    }

    #[test]
    fn test_shared_node_is_rejected() {
        let doc = document(json!({
            "asset": {"version": "2.0"},
            "scenes": [{"nodes": [0, 1]}],
            "nodes": [
                {"translation": [1, 0, 0], "children": [2]},
                {"translation": [0, 0, 5], "children": [2]},
                {"name": "leaf", "translation": [0, 1, 0]}
            ]
        }));
        let err = build_scene_graph(&doc, None).unwrap_err();
        assert!(matches!(err, GltfError::SchemaViolation { .. }));
        assert!(err.to_string().contains("nodes[2]"));
    }

    #[test]
    fn test_repeated_children_do_not_multiply() {
        // Each node lists its successor twice; instancing every path would
        // produce 2^24 nodes.
        let nodes: Vec<Value> = (0..24)
            .map(|i| {
                if i < 23 {
                    json!({"children": [i + 1, i + 1]})
                } else {
                    json!({})
                }
            })
            .collect();
        let doc = document(json!({
            "asset": {"version": "2.0"},
            "scenes": [{"nodes": [0]}],
            "nodes": nodes
        }));
        assert!(matches!(
            build_scene_graph(&doc, None),
            Err(GltfError::SchemaViolation { .. })
        ));
    }

    #[test]
    fn test_root_listed_twice() {
        let doc = document(json!({
            "asset": {"version": "2.0"},
            "scenes": [{"nodes": [0, 0]}],
            "nodes": [{}]
        }));
        assert!(matches!(
            build_scene_graph(&doc, None),
            Err(GltfError::SchemaViolation { .. })
        ));
    }

    #[test]
    fn test_no_scene() {
        let doc = document(json!({"asset": {"version": "2.0"}, "nodes": [{}]}));
        assert_eq!(build_scene_graph(&doc, None), Err(GltfError::NoScene));
    }

    #[test]
    fn test_scene_choice() {
        let doc = document(json!({
            "asset": {"version": "2.0"},
            "scene": 1,
            "scenes": [{"nodes": [0]}, {"name": "second", "nodes": [1]}],
            "nodes": [{"name": "a"}, {"name": "b"}]
        }));
        let default = build_scene_graph(&doc, None).unwrap();
        assert_eq!(default.name.as_deref(), Some("second"));

        let explicit = build_scene_graph(&doc, Some(SceneIndex::new(0))).unwrap();
        assert_eq!(explicit.find_by_name("a"), Some(0));

        let fallback = build_scene_graph(&doc, Some(SceneIndex::new(7))).unwrap();
        assert_eq!(fallback.scene.value(), 1);
    }

    #[test]
    fn test_traversal_order_and_bindings() {
        let doc = document(json!({
            "asset": {"version": "2.0"},
            "scenes": [{"nodes": [0, 3]}],
            "nodes": [
                {"name": "root", "children": [1, 2]},
                {"name": "a", "mesh": 0, "skin": 0},
                {"name": "b", "camera": 0},
                {"name": "c"}
            ],
            "meshes": [{"primitives": [
                {"attributes": {"POSITION": 0}, "material": 2},
                {"attributes": {"POSITION": 0}, "mode": 1}
            ]}]
        }));
        let graph = build_scene_graph(&doc, None).unwrap();
        let names: Vec<_> = graph
            .traverse()
            .map(|(_, node)| node.name.as_deref().unwrap_or_default())
            .collect();
        assert_eq!(names, vec!["root", "a", "b", "c"]);

        let instances: Vec<_> = graph.mesh_instances().collect();
        assert_eq!(instances.len(), 1);
        let (_, node, binding) = instances[0];
        assert_eq!(node.skin.map(|s| s.value()), Some(0));
        assert_eq!(binding.primitives.len(), 2);
        assert_eq!(binding.primitives[0].material.map(|m| m.value()), Some(2));
        assert_eq!(binding.primitives[1].mode, glint_core::Mode::Lines);

        let b = graph.find_by_name("b").unwrap();
        assert_eq!(graph.node(b).unwrap().camera.map(|c| c.value()), Some(0));
    }

    #[test]
    fn test_missing_child() {
        let doc = document(json!({
            "asset": {"version": "2.0"},
            "scenes": [{"nodes": [0]}],
            "nodes": [{"children": [4]}]
        }));
        assert!(matches!(
            build_scene_graph(&doc, None),
            Err(GltfError::ReferenceOutOfRange { target: "node", index: 4, .. })
        ));
    }

    #[test]
    fn test_matrix_node_keeps_local() {
        let m = Mat4::from_scale(Vec3::new(-1.0, 1.0, 1.0));
        let doc = document(json!({
            "asset": {"version": "2.0"},
            "scenes": [{"nodes": [0]}],
            "nodes": [{"matrix": m.to_cols_array()}]
        }));
        let graph = build_scene_graph(&doc, None).unwrap();
        assert_eq!(graph.nodes[0].local, m);
        assert_eq!(graph.nodes[0].world, m);
        assert!(graph.nodes[0].transform.scale.x < 0.0);
    }
}

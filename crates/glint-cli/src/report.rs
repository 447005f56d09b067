//! Text reports printed by the subcommands.

use std::fmt::Write;

use glint::{ComponentData, Import, SceneGraph};
use glint_core::AccessorIndex;

/// Counts of the document's arrays plus extension usage.
pub fn info(import: &Import) -> String {
    let doc = import.document();
    let mut out = String::new();
    let _ = writeln!(out, "container:  {:?}", import.kind);
    let _ = writeln!(out, "version:    {}", doc.asset.version);
    if let Some(generator) = &doc.asset.generator {
        let _ = writeln!(out, "generator:  {}", generator);
    }
    let counts = [
        ("scenes", doc.scenes.len()),
        ("nodes", doc.nodes.len()),
        ("meshes", doc.meshes.len()),
        ("materials", doc.materials.len()),
        ("textures", doc.textures.len()),
        ("images", doc.images.len()),
        ("accessors", doc.accessors.len()),
        ("bufferViews", doc.buffer_views.len()),
        ("buffers", doc.buffers.len()),
        ("animations", doc.animations.len()),
        ("skins", doc.skins.len()),
        ("cameras", doc.cameras.len()),
    ];
    for (name, count) in counts {
        let _ = writeln!(out, "{:<12}{}", format!("{}:", name), count);
    }
    if !doc.extensions_used.is_empty() {
        let _ = writeln!(out, "extensions: {}", doc.extensions_used.join(", "));
    }
    out
}

/// Indented node hierarchy with world positions.
pub fn tree(graph: &SceneGraph) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "scene {}{}",
        graph.scene.value(),
        graph
            .name
            .as_deref()
            .map(|n| format!(" \"{}\"", n))
            .unwrap_or_default()
    );
    for (id, node) in graph.traverse() {
        let indent = "  ".repeat(graph.depth(id) + 1);
        let name = node.name.as_deref().unwrap_or("<unnamed>");
        let p = node.world.w_axis;
        let _ = write!(
            out,
            "{}node {} {} @ [{:.3}, {:.3}, {:.3}]",
            indent,
            node.source.value(),
            name,
            p.x,
            p.y,
            p.z
        );
        if let Some(binding) = &node.mesh {
            let _ = write!(
                out,
                " mesh {} ({} primitives)",
                binding.mesh.value(),
                binding.primitives.len()
            );
        }
        if let Some(camera) = node.camera {
            let _ = write!(out, " camera {}", camera.value());
        }
        if let Some(skin) = node.skin {
            let _ = write!(out, " skin {}", skin.value());
        }
        out.push('\n');
    }
    out
}

/// Accessor header followed by up to `limit` decoded elements.
pub fn accessor(import: &Import, index: AccessorIndex, limit: usize) -> glint_core::Result<String> {
    let array = import.resolver.accessor(index)?;
    let declared = import.document().require(index, "command line")?;
    let mut out = String::new();
    let _ = writeln!(
        out,
        "accessor {}: {} x {:?} {:?}{}",
        index.value(),
        array.len(),
        array.element_type,
        array.component_type(),
        if array.normalized { " normalized" } else { "" }
    );
    if let (Some(min), Some(max)) = (&declared.min, &declared.max) {
        let _ = writeln!(out, "bounds: {:?} .. {:?}", min, max);
    }

    let width = array.element_type.components();
    let values: Vec<String> = match &array.data {
        ComponentData::F32(_) => array.to_f32().iter().map(|v| format!("{}", v)).collect(),
        _ if array.normalized => array.to_f32().iter().map(|v| format!("{:.4}", v)).collect(),
        ComponentData::I8(v) => v.iter().map(|c| c.to_string()).collect(),
        ComponentData::U8(v) => v.iter().map(|c| c.to_string()).collect(),
        ComponentData::I16(v) => v.iter().map(|c| c.to_string()).collect(),
        ComponentData::U16(v) => v.iter().map(|c| c.to_string()).collect(),
        ComponentData::U32(v) => v.iter().map(|c| c.to_string()).collect(),
    };
    for (i, element) in values.chunks(width).take(limit).enumerate() {
        let _ = writeln!(out, "[{}] {}", i, element.join(" "));
    }
    if array.len() > limit {
        let _ = writeln!(out, "... {} more", array.len() - limit);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glint::{Importer, ReadOptions};

    const DOC: &str = r#"{
        "asset": {"version": "2.0", "generator": "hand"},
        "scenes": [{"name": "main", "nodes": [0]}],
        "nodes": [
            {"name": "root", "translation": [1, 0, 0], "children": [1]},
            {"name": "leaf", "translation": [0, 2, 0], "mesh": 0}
        ],
        "meshes": [{"primitives": [{"attributes": {"POSITION": 0}}]}],
        "buffers": [{"byteLength": 6, "uri": "data:application/octet-stream;base64,AAABAAIA"}],
        "bufferViews": [{"buffer": 0, "byteLength": 6}],
        "accessors": [{"bufferView": 0, "componentType": 5123, "count": 3, "type": "SCALAR"}]
    }"#;

    fn import() -> Import {
        Importer::new().import(DOC.as_bytes(), &ReadOptions::new()).unwrap()
    }

    #[test]
    fn test_info() {
        let text = info(&import());
        assert!(text.contains("generator:  hand"));
        assert!(text.contains("nodes:      2"));
    }

    #[test]
    fn test_tree() {
        let import = import();
        let text = tree(import.scene().unwrap());
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "scene 0 \"main\"");
        assert_eq!(lines[1], "  node 0 root @ [1.000, 0.000, 0.000]");
        assert_eq!(lines[2], "    node 1 leaf @ [1.000, 2.000, 0.000] mesh 0 (1 primitives)");
    }

    #[test]
    fn test_accessor() {
        let text = accessor(&import(), AccessorIndex::new(0), 2).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "accessor 0: 3 x Scalar U16");
        assert_eq!(lines[1], "[0] 0");
        assert_eq!(lines[2], "[1] 1");
        assert_eq!(lines[3], "... 1 more");
    }
}

//! JSON document parsing.

use glint_core::{Document, ExtensionRegistry, GltfError, Result};

use crate::container::{parse_container, write_glb, ContainerKind};
use crate::validate::validate;

/// Parses glTF JSON into a validated [`Document`].
///
/// Extension entries with a factory in the registry receive typed payloads;
/// all others stay opaque.
#[derive(Debug, Clone, Copy)]
pub struct DocumentParser<'r> {
    registry: &'r ExtensionRegistry,
}

impl<'r> DocumentParser<'r> {
    /// Create a parser dispatching extensions through `registry`.
    pub fn new(registry: &'r ExtensionRegistry) -> Self {
        Self { registry }
    }

    /// Parse and validate a JSON document.
    pub fn parse(&self, json: &[u8]) -> Result<Document> {
        let document: Document = serde_json::from_slice(json)?;

        if !document.asset.version.starts_with("2.") {
            return Err(GltfError::schema(format!(
                "unsupported glTF version {}",
                document.asset.version
            )));
        }

        validate(&document)?;

        for name in &document.extensions_required {
            if !self.registry.contains(name) {
                log::warn!(
                    "required extension {} has no registered factory; keeping it opaque",
                    name
                );
            }
        }

        let attached = self.registry.attach_all(&document)?;
        log::debug!(
            "parsed document: {} nodes, {} meshes, {} accessors, {} buffers, {} typed extensions",
            document.nodes.len(),
            document.meshes.len(),
            document.accessors.len(),
            document.buffers.len(),
            attached
        );

        Ok(document)
    }
}

/// A parsed asset together with the binary chunks of its container.
#[derive(Debug, Clone, PartialEq)]
pub struct Gltf {
    pub document: Document,
    /// Layout the asset was read from.
    pub kind: ContainerKind,
    /// BIN chunks in file order.
    pub chunks: Vec<Vec<u8>>,
}

impl Gltf {
    /// The chunk backing buffer 0.
    pub fn binary_chunk(&self) -> Option<&[u8]> {
        self.chunks.first().map(Vec::as_slice)
    }

    /// Serialize back into a GLB container.
    pub fn to_glb(&self) -> Result<Vec<u8>> {
        let json = serde_json::to_vec(&self.document)?;
        Ok(write_glb(&json, self.binary_chunk()))
    }
}

/// Read a `.gltf` or `.glb` file's bytes into a [`Gltf`].
pub fn parse_gltf(bytes: &[u8], registry: &ExtensionRegistry) -> Result<Gltf> {
    let container = parse_container(bytes)?;
    let document = DocumentParser::new(registry).parse(container.json)?;
    Ok(Gltf {
        document,
        kind: container.kind,
        chunks: container.chunks.iter().map(|chunk| chunk.to_vec()).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use glint_core::{AlphaMode, Mode, NodeIndex};
    use serde_json::{json, Value};

    fn parse(value: Value) -> Result<Document> {
        let registry = ExtensionRegistry::new();
        DocumentParser::new(&registry).parse(value.to_string().as_bytes())
    }

    fn sample() -> Value {
        json!({
            "asset": {"version": "2.0", "generator": "glint tests"},
            "scene": 0,
            "scenes": [{"name": "main", "nodes": [0]}],
            "nodes": [
                {"name": "root", "children": [1], "translation": [1, 0, 0]},
                {"name": "leaf", "mesh": 0, "rotation": [0, 0, 0, 1]}
            ],
            "meshes": [{"primitives": [{
                "attributes": {"POSITION": 0},
                "indices": 1,
                "material": 0
            }]}],
            "materials": [{"alphaMode": "MASK", "extensions": {"EXT_vendor": {"x": 1}}}],
            "accessors": [
                {"bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
                 "min": [0, 0, 0], "max": [1, 1, 0]},
                {"bufferView": 1, "componentType": 5123, "count": 3, "type": "SCALAR"}
            ],
            "bufferViews": [
                {"buffer": 0, "byteLength": 36},
                {"buffer": 0, "byteOffset": 36, "byteLength": 6}
            ],
            "buffers": [{"byteLength": 44}],
            "extensionsUsed": ["EXT_vendor"],
            "extras": {"author": "someone"}
        })
    }

    #[test]
    fn test_parse_sample() {
        let doc = parse(sample()).unwrap();
        assert_eq!(doc.nodes[0].children, vec![NodeIndex::new(1)]);
        assert_eq!(doc.materials[0].alpha_mode, AlphaMode::Mask);
        assert_eq!(doc.meshes[0].primitives[0].mode, Mode::Triangles);
        assert_eq!(doc.extras, Some(json!({"author": "someone"})));

        let entry = doc.materials[0].extensions.get("EXT_vendor").unwrap();
        assert!(entry.is_opaque());
        assert_eq!(entry.raw(), &json!({"x": 1}));
    }

    #[test]
    fn test_unknown_fields_ignored() {
        let mut value = sample();
        value["nodes"][0]["futureField"] = json!(true);
        value["somethingNew"] = json!([1, 2]);
        parse(value).unwrap();
    }

    #[test]
    fn test_missing_required_field() {
        let mut value = sample();
        value["accessors"][0].as_object_mut().unwrap().remove("count");
        let err = parse(value).unwrap_err();
        assert!(matches!(err, GltfError::SchemaViolation { .. }));
        assert!(err.to_string().contains("count"));
    }

    #[test]
    fn test_wrong_type() {
        let mut value = sample();
        value["nodes"][0]["children"] = json!(["one"]);
        assert!(matches!(parse(value), Err(GltfError::SchemaViolation { .. })));
    }

    #[test]
    fn test_negative_index_rejected() {
        let mut value = sample();
        value["scenes"][0]["nodes"] = json!([-1]);
        assert!(matches!(parse(value), Err(GltfError::SchemaViolation { .. })));
    }

    #[test]
    fn test_unknown_component_type() {
        let mut value = sample();
        value["accessors"][0]["componentType"] = json!(5124);
        let err = parse(value).unwrap_err();
        assert!(err.to_string().contains("unknown component type 5124"));
    }

    #[test]
    fn test_reference_out_of_range() {
        let mut value = sample();
        value["meshes"][0]["primitives"][0]["material"] = json!(4);
        assert_eq!(
            parse(value).unwrap_err(),
            GltfError::ReferenceOutOfRange {
                referrer: "meshes[0].primitives[0].material".into(),
                target: "material",
                index: 4,
                len: 1,
            }
        );
    }

    #[test]
    fn test_gltf_1_rejected() {
        let mut value = sample();
        value["asset"]["version"] = json!("1.0");
        assert!(matches!(parse(value), Err(GltfError::SchemaViolation { .. })));
    }

    #[test]
    fn test_required_extension_without_factory_is_kept() {
        let mut value = sample();
        value["extensionsRequired"] = json!(["EXT_vendor"]);
        let doc = parse(value).unwrap();
        assert!(doc.materials[0].extensions.contains("EXT_vendor"));
    }

    #[test]
    fn test_registered_factory_attaches_payload() {
        #[derive(Debug, PartialEq)]
        struct Vendor(i64);

        let mut registry = ExtensionRegistry::new();
        registry
            .register_fn("EXT_vendor", |raw: &Value, _: &Document| {
                raw["x"]
                    .as_i64()
                    .map(Vendor)
                    .ok_or_else(|| GltfError::schema("x must be an integer"))
            })
            .unwrap();

        let json = sample().to_string();
        let doc = DocumentParser::new(&registry).parse(json.as_bytes()).unwrap();
        assert_eq!(
            doc.materials[0].extensions.payload::<Vendor>("EXT_vendor"),
            Some(&Vendor(1))
        );
    }

    #[test]
    fn test_glb_round_trip() {
        let json = sample().to_string();
        let bin = vec![7u8; 44];
        let glb = write_glb(json.as_bytes(), Some(&bin));

        let registry = ExtensionRegistry::new();
        let first = parse_gltf(&glb, &registry).unwrap();
        assert_eq!(first.kind, ContainerKind::Binary);
        assert_eq!(first.binary_chunk(), Some(&bin[..]));

        let second = parse_gltf(&first.to_glb().unwrap(), &registry).unwrap();
        assert_eq!(second.document, first.document);
        assert_eq!(second.chunks, first.chunks);
    }

    #[test]
    fn test_plain_json_has_no_chunks() {
        let registry = ExtensionRegistry::new();
        let gltf = parse_gltf(sample().to_string().as_bytes(), &registry).unwrap();
        assert_eq!(gltf.kind, ContainerKind::Json);
        assert!(gltf.chunks.is_empty());
    }

    #[test]
    fn test_short_header_length_is_malformed() {
        let json = sample().to_string();
        let mut glb = write_glb(json.as_bytes(), Some(&[0; 44]));
        let declared = glb.len() as u32 - 4;
        glb[8..12].copy_from_slice(&declared.to_le_bytes());

        let registry = ExtensionRegistry::new();
        assert!(matches!(
            parse_gltf(&glb, &registry),
            Err(GltfError::MalformedContainer { .. })
        ));
    }
}

//! Vertex streams of mesh primitives.

use std::sync::Arc;

use glam::{Vec2, Vec3, Vec4};
use glint_core::{
    AccessorIndex, Document, GltfError, MaterialIndex, MeshIndex, Mode, Primitive, Result, Semantic,
};

use crate::accessor::{indices_from, TypedArray};

/// Decoded vertex data of one primitive, ready for upload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PrimitiveData {
    pub positions: Vec<Vec3>,
    pub normals: Option<Vec<Vec3>>,
    pub tangents: Option<Vec<Vec4>>,
    /// `TEXCOORD_n` sets in set order.
    pub tex_coords: Vec<Vec<Vec2>>,
    /// `COLOR_n` sets; VEC3 colors get alpha 1.
    pub colors: Vec<Vec<Vec4>>,
    pub joints: Vec<Vec<[u16; 4]>>,
    pub weights: Vec<Vec<Vec4>>,
    /// Vertex indices. Non-indexed primitives get `0..vertex_count`.
    pub indices: Vec<u32>,
    pub material: Option<MaterialIndex>,
    pub mode: Mode,
}

impl PrimitiveData {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }
}

/// Assemble the vertex streams of `primitive` of `mesh`.
///
/// `decode` supplies decoded accessors, typically from a resolver cache.
pub fn read_primitive<F>(
    document: &Document,
    mesh: MeshIndex,
    primitive: usize,
    decode: F,
) -> Result<PrimitiveData>
where
    F: Fn(AccessorIndex) -> Result<Arc<TypedArray>>,
{
    let mesh_def = document.require(mesh, "primitive request")?;
    let prim = mesh_def.primitives.get(primitive).ok_or_else(|| {
        GltfError::out_of_range(
            format!("meshes[{}]", mesh.value()),
            "primitive",
            primitive,
            mesh_def.primitives.len(),
        )
    })?;
    let what = |semantic: &Semantic| {
        format!("meshes[{}].primitives[{}].{}", mesh.value(), primitive, semantic)
    };

    let mut data = PrimitiveData {
        material: prim.material,
        mode: prim.mode,
        ..PrimitiveData::default()
    };

    if let Some(index) = prim.get(&Semantic::Position) {
        data.positions = expect(decode(index)?.to_vec3(), || what(&Semantic::Position), "VEC3")?;
    }
    if let Some(index) = prim.get(&Semantic::Normal) {
        data.normals = Some(expect(decode(index)?.to_vec3(), || what(&Semantic::Normal), "VEC3")?);
    }
    if let Some(index) = prim.get(&Semantic::Tangent) {
        data.tangents = Some(expect(decode(index)?.to_vec4(), || what(&Semantic::Tangent), "VEC4")?);
    }

    for (set, index) in sets(prim, Semantic::TexCoord) {
        let semantic = Semantic::TexCoord(set);
        data.tex_coords
            .push(expect(decode(index)?.to_vec2(), || what(&semantic), "VEC2")?);
    }
    for (set, index) in sets(prim, Semantic::Color) {
        let semantic = Semantic::Color(set);
        let array = decode(index)?;
        let colors = match array.to_vec4() {
            Some(colors) => Some(colors),
            None => array
                .to_vec3()
                .map(|rgb| rgb.into_iter().map(|c| c.extend(1.0)).collect()),
        };
        data.colors.push(expect(colors, || what(&semantic), "VEC3 or VEC4")?);
    }
    for (set, index) in sets(prim, Semantic::Joints) {
        let semantic = Semantic::Joints(set);
        data.joints
            .push(expect(decode(index)?.to_u16x4(), || what(&semantic), "unsigned VEC4")?);
    }
    for (set, index) in sets(prim, Semantic::Weights) {
        let semantic = Semantic::Weights(set);
        data.weights
            .push(expect(decode(index)?.to_vec4(), || what(&semantic), "VEC4")?);
    }

    let vertex_count = vertex_count(document, prim);
    data.indices = match prim.indices {
        Some(index) => {
            let array = decode(index)?;
            let indices = indices_from(&array, index.value())?;
            if let Some((at, &bad)) = indices
                .iter()
                .enumerate()
                .find(|&(_, &i)| i as usize >= vertex_count)
            {
                return Err(GltfError::corrupt_indices(
                    index.value(),
                    format!(
                        "index {} at position {} exceeds the {} vertices",
                        bad, at, vertex_count
                    ),
                ));
            }
            indices
        }
        None => (0..vertex_count as u32).collect(),
    };

    log::trace!(
        "mesh {} primitive {}: {} vertices, {} indices",
        mesh.value(),
        primitive,
        vertex_count,
        data.indices.len()
    );
    Ok(data)
}

/// Number of vertices: the POSITION count, else that of any attribute.
fn vertex_count(document: &Document, prim: &Primitive) -> usize {
    prim.get(&Semantic::Position)
        .or_else(|| prim.attributes.values().next().copied())
        .and_then(|index| document.get(index))
        .map_or(0, |accessor| accessor.count)
}

/// Indexed attribute sets of one kind, ordered by set number.
fn sets(prim: &Primitive, kind: fn(u32) -> Semantic) -> Vec<(u32, AccessorIndex)> {
    let mut found: Vec<_> = prim
        .semantics()
        .filter_map(|(semantic, index)| match semantic {
            Semantic::TexCoord(n) | Semantic::Color(n) | Semantic::Joints(n) | Semantic::Weights(n)
                if semantic == kind(n) =>
            {
                Some((n, index))
            }
            _ => None,
        })
        .collect();
    found.sort_by_key(|(n, _)| *n);
    found
}

fn expect<T>(value: Option<T>, what: impl FnOnce() -> String, shape: &str) -> Result<T> {
    value.ok_or_else(|| GltfError::schema(format!("{} must be {}", what(), shape)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accessor::decode_accessor;
    use serde_json::json;

    fn f32_bytes(values: &[f32]) -> Vec<u8> {
        values.iter().flat_map(|v| v.to_le_bytes()).collect()
    }

    /// Triangle with POSITION, COLOR_0 (VEC3) and u16 indices at accessors 0, 1, 2.
    fn triangle(indices: [u16; 3]) -> (Document, Vec<Vec<u8>>) {
        let mut bytes = f32_bytes(&[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0]);
        bytes.extend(f32_bytes(&[1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0]));
        bytes.extend(indices.iter().flat_map(|i| i.to_le_bytes()));
        let doc = serde_json::from_value(json!({
            "asset": {"version": "2.0"},
            "buffers": [{"byteLength": 78}],
            "bufferViews": [
                {"buffer": 0, "byteLength": 36},
                {"buffer": 0, "byteOffset": 36, "byteLength": 36},
                {"buffer": 0, "byteOffset": 72, "byteLength": 6}
            ],
            "accessors": [
                {"bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3"},
                {"bufferView": 1, "componentType": 5126, "count": 3, "type": "VEC3"},
                {"bufferView": 2, "componentType": 5123, "count": 3, "type": "SCALAR"}
            ],
            "meshes": [{"primitives": [
                {"attributes": {"POSITION": 0, "COLOR_0": 1}, "indices": 2, "material": 0},
                {"attributes": {"POSITION": 0}}
            ]}]
        }))
        .unwrap();
        (doc, vec![bytes])
    }

    fn read(doc: &Document, buffers: &Vec<Vec<u8>>, primitive: usize) -> Result<PrimitiveData> {
        read_primitive(doc, MeshIndex::new(0), primitive, |index| {
            decode_accessor(doc, index, buffers).map(Arc::new)
        })
    }

    #[test]
    fn test_indexed_primitive() {
        let (doc, buffers) = triangle([0, 1, 2]);
        let data = read(&doc, &buffers, 0).unwrap();
        assert_eq!(data.vertex_count(), 3);
        assert_eq!(data.positions[1], Vec3::X);
        assert_eq!(data.colors[0][2], Vec4::new(0.0, 0.0, 1.0, 1.0));
        assert_eq!(data.indices, vec![0, 1, 2]);
        assert_eq!(data.material.map(|m| m.value()), Some(0));
        assert_eq!(data.mode, Mode::Triangles);
        assert!(data.normals.is_none());
    }

    #[test]
    fn test_generated_indices() {
        let (doc, buffers) = triangle([0, 1, 2]);
        let data = read(&doc, &buffers, 1).unwrap();
        assert_eq!(data.indices, vec![0, 1, 2]);
    }

    #[test]
    fn test_index_past_vertex_count() {
        let (doc, buffers) = triangle([0, 1, 3]);
        let err = read(&doc, &buffers, 0).unwrap_err();
        assert!(matches!(err, GltfError::CorruptIndexData { accessor: 2, .. }));
    }

    #[test]
    fn test_missing_primitive() {
        let (doc, buffers) = triangle([0, 1, 2]);
        assert!(matches!(
            read(&doc, &buffers, 5),
            Err(GltfError::ReferenceOutOfRange { target: "primitive", index: 5, len: 2, .. })
        ));
    }
}

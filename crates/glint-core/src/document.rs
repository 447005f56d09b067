//! The glTF root object and the scene-level types.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::accessor::{Accessor, Buffer, BufferView};
use crate::animation::{Animation, Camera, Skin};
use crate::errors::{GltfError, Result};
use crate::extension::Extensions;
use crate::material::{Image, Material, Sampler, Texture};
use crate::semantic::Semantic;
use crate::{
    AccessorIndex, CameraIndex, Index, MaterialIndex, MeshIndex, NodeIndex, SceneIndex, SkinIndex,
};

/// Root of a parsed glTF asset.
///
/// Every array position is the identity of its element. Cross references are
/// typed [`Index`] values; a document returned by the parser has all of them
/// in bounds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Asset information.
    pub asset: Asset,
    /// Default scene.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scene: Option<SceneIndex>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scenes: Vec<Scene>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nodes: Vec<Node>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub meshes: Vec<Mesh>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub accessors: Vec<Accessor>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub buffer_views: Vec<BufferView>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub buffers: Vec<Buffer>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub materials: Vec<Material>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub textures: Vec<Texture>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<Image>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub samplers: Vec<Sampler>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub animations: Vec<Animation>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skins: Vec<Skin>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cameras: Vec<Camera>,
    /// Extension names used anywhere in the asset.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extensions_used: Vec<String>,
    /// Extension names a loader must understand.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extensions_required: Vec<String>,
    #[serde(default, skip_serializing_if = "Extensions::is_empty")]
    pub extensions: Extensions,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extras: Option<serde_json::Value>,
}

impl Document {
    /// Look up an element by typed index.
    pub fn get<T: Element>(&self, index: Index<T>) -> Option<&T> {
        index.get(T::arena(self))
    }

    /// Look up an element, reporting `referrer` when the index is out of range.
    pub fn require<T: Element>(&self, index: Index<T>, referrer: &str) -> Result<&T> {
        let arena = T::arena(self);
        index
            .get(arena)
            .ok_or_else(|| GltfError::out_of_range(referrer, T::NAME, index.value(), arena.len()))
    }

    /// Scene to show when the caller has no preference: `scene`, else the
    /// first scene.
    pub fn default_scene_index(&self) -> Option<SceneIndex> {
        match self.scene {
            Some(scene) if scene.value() < self.scenes.len() => Some(scene),
            _ if !self.scenes.is_empty() => Some(SceneIndex::new(0)),
            _ => None,
        }
    }

    /// Every extension map in the document, labelled with its JSON location.
    pub fn extension_maps(&self) -> Vec<(String, &Extensions)> {
        let mut maps = vec![("root".to_string(), &self.extensions)];

        for (i, scene) in self.scenes.iter().enumerate() {
            maps.push((format!("scenes[{}]", i), &scene.extensions));
        }
        for (i, node) in self.nodes.iter().enumerate() {
            maps.push((format!("nodes[{}]", i), &node.extensions));
        }
        for (i, mesh) in self.meshes.iter().enumerate() {
            maps.push((format!("meshes[{}]", i), &mesh.extensions));
            for (p, primitive) in mesh.primitives.iter().enumerate() {
                maps.push((format!("meshes[{}].primitives[{}]", i, p), &primitive.extensions));
            }
        }
        for (i, accessor) in self.accessors.iter().enumerate() {
            maps.push((format!("accessors[{}]", i), &accessor.extensions));
        }
        for (i, view) in self.buffer_views.iter().enumerate() {
            maps.push((format!("bufferViews[{}]", i), &view.extensions));
        }
        for (i, buffer) in self.buffers.iter().enumerate() {
            maps.push((format!("buffers[{}]", i), &buffer.extensions));
        }
        for (i, material) in self.materials.iter().enumerate() {
            let at = format!("materials[{}]", i);
            let pbr = &material.pbr_metallic_roughness;
            if let Some(info) = &pbr.base_color_texture {
                maps.push((format!("{}.baseColorTexture", at), &info.extensions));
            }
            if let Some(info) = &pbr.metallic_roughness_texture {
                maps.push((format!("{}.metallicRoughnessTexture", at), &info.extensions));
            }
            if let Some(info) = &material.normal_texture {
                maps.push((format!("{}.normalTexture", at), &info.extensions));
            }
            if let Some(info) = &material.occlusion_texture {
                maps.push((format!("{}.occlusionTexture", at), &info.extensions));
            }
            if let Some(info) = &material.emissive_texture {
                maps.push((format!("{}.emissiveTexture", at), &info.extensions));
            }
            maps.push((format!("{}.pbrMetallicRoughness", at), &pbr.extensions));
            maps.push((at, &material.extensions));
        }
        for (i, texture) in self.textures.iter().enumerate() {
            maps.push((format!("textures[{}]", i), &texture.extensions));
        }
        for (i, image) in self.images.iter().enumerate() {
            maps.push((format!("images[{}]", i), &image.extensions));
        }
        for (i, sampler) in self.samplers.iter().enumerate() {
            maps.push((format!("samplers[{}]", i), &sampler.extensions));
        }
        for (i, animation) in self.animations.iter().enumerate() {
            maps.push((format!("animations[{}]", i), &animation.extensions));
            for (c, channel) in animation.channels.iter().enumerate() {
                let at = format!("animations[{}].channels[{}]", i, c);
                maps.push((format!("{}.target", at), &channel.target.extensions));
                maps.push((at, &channel.extensions));
            }
            for (s, sampler) in animation.samplers.iter().enumerate() {
                maps.push((format!("animations[{}].samplers[{}]", i, s), &sampler.extensions));
            }
        }
        for (i, skin) in self.skins.iter().enumerate() {
            maps.push((format!("skins[{}]", i), &skin.extensions));
        }
        for (i, camera) in self.cameras.iter().enumerate() {
            maps.push((format!("cameras[{}]", i), &camera.extensions));
        }

        maps.retain(|(_, extensions)| !extensions.is_empty());
        maps
    }
}

/// An element stored in one of the document's arrays.
pub trait Element: Sized {
    /// Array name used in error messages.
    const NAME: &'static str;

    /// The array holding elements of this type.
    fn arena(document: &Document) -> &[Self];
}

macro_rules! element {
    ($ty:ty, $field:ident, $name:literal) => {
        impl Element for $ty {
            const NAME: &'static str = $name;

            fn arena(document: &Document) -> &[Self] {
                &document.$field
            }
        }
    };
}

element!(Scene, scenes, "scene");
element!(Node, nodes, "node");
element!(Mesh, meshes, "mesh");
element!(Accessor, accessors, "accessor");
element!(BufferView, buffer_views, "bufferView");
element!(Buffer, buffers, "buffer");
element!(Material, materials, "material");
element!(Texture, textures, "texture");
element!(Image, images, "image");
element!(Sampler, samplers, "sampler");
element!(Animation, animations, "animation");
element!(Skin, skins, "skin");
element!(Camera, cameras, "camera");

/// Asset metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    /// glTF version, "2.0" for every asset glint reads.
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generator: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub copyright: Option<String>,
    #[serde(default, skip_serializing_if = "Extensions::is_empty")]
    pub extensions: Extensions,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extras: Option<serde_json::Value>,
}

impl Default for Asset {
    fn default() -> Self {
        Self {
            version: "2.0".to_string(),
            min_version: None,
            generator: None,
            copyright: None,
            extensions: Extensions::default(),
            extras: None,
        }
    }
}

/// A set of root nodes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nodes: Vec<NodeIndex>,
    #[serde(default, skip_serializing_if = "Extensions::is_empty")]
    pub extensions: Extensions,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extras: Option<serde_json::Value>,
}

/// A node in the node hierarchy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeIndex>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mesh: Option<MeshIndex>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skin: Option<SkinIndex>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub camera: Option<CameraIndex>,
    /// Column-major local matrix; exclusive with TRS.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matrix: Option<[f32; 16]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translation: Option<[f32; 3]>,
    /// Unit quaternion (x, y, z, w).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<[f32; 4]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<[f32; 3]>,
    /// Morph target weights.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weights: Option<Vec<f32>>,
    #[serde(default, skip_serializing_if = "Extensions::is_empty")]
    pub extensions: Extensions,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extras: Option<serde_json::Value>,
}

impl Node {
    /// Whether any of translation, rotation or scale is present.
    pub fn has_trs(&self) -> bool {
        self.translation.is_some() || self.rotation.is_some() || self.scale.is_some()
    }
}

/// A set of primitives drawn together.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub primitives: Vec<Primitive>,
    /// Default morph target weights.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weights: Option<Vec<f32>>,
    #[serde(default, skip_serializing_if = "Extensions::is_empty")]
    pub extensions: Extensions,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extras: Option<serde_json::Value>,
}

gl_enum! {
    /// Primitive topology.
    pub enum Mode : "primitive mode" {
        Points = 0,
        Lines = 1,
        LineLoop = 2,
        LineStrip = 3,
        Triangles = 4,
        TriangleStrip = 5,
        TriangleFan = 6,
    }
}

impl Default for Mode {
    fn default() -> Self {
        Self::Triangles
    }
}

/// Geometry to be rendered with one material.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Primitive {
    /// Attribute name to accessor, in document order.
    pub attributes: IndexMap<String, AccessorIndex>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub indices: Option<AccessorIndex>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub material: Option<MaterialIndex>,
    #[serde(default)]
    pub mode: Mode,
    /// Morph targets.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub targets: Vec<IndexMap<String, AccessorIndex>>,
    #[serde(default, skip_serializing_if = "Extensions::is_empty")]
    pub extensions: Extensions,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extras: Option<serde_json::Value>,
}

impl Primitive {
    /// Accessor bound to `semantic`.
    pub fn get(&self, semantic: &Semantic) -> Option<AccessorIndex> {
        self.attributes.get(semantic.to_string().as_str()).copied()
    }

    /// Attributes whose names parse as a [`Semantic`].
    pub fn semantics(&self) -> impl Iterator<Item = (Semantic, AccessorIndex)> + '_ {
        self.attributes
            .iter()
            .filter_map(|(name, &accessor)| Semantic::parse(name).map(|s| (s, accessor)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_document() {
        let doc: Document = serde_json::from_str(r#"{"asset": {"version": "2.0"}}"#).unwrap();
        assert_eq!(doc.asset.version, "2.0");
        assert!(doc.nodes.is_empty());
        assert_eq!(doc.default_scene_index(), None);
    }

    #[test]
    fn test_asset_required() {
        assert!(serde_json::from_str::<Document>("{}").is_err());
    }

    #[test]
    fn test_require_reports_range() {
        let doc = Document::default();
        let err = doc.require(NodeIndex::new(3), "scenes[0]").unwrap_err();
        assert_eq!(
            err,
            GltfError::ReferenceOutOfRange {
                referrer: "scenes[0]".into(),
                target: "node",
                index: 3,
                len: 0,
            }
        );
    }

    #[test]
    fn test_mode_codes() {
        assert_eq!(Mode::try_from(5), Ok(Mode::TriangleStrip));
        assert_eq!(u32::from(Mode::Lines), 1);
        assert_eq!(Mode::try_from(9), Err("unknown primitive mode 9".to_string()));

        let primitive: Primitive =
            serde_json::from_str(r#"{"attributes": {"POSITION": 0}, "mode": 2}"#).unwrap();
        assert_eq!(primitive.mode, Mode::LineLoop);
        assert!(serde_json::from_str::<Primitive>(r#"{"attributes": {}, "mode": 7}"#).is_err());
    }

    #[test]
    fn test_default_scene_index() {
        let mut doc = Document {
            scenes: vec![Scene::default(), Scene::default()],
            ..Default::default()
        };
        assert_eq!(doc.default_scene_index(), Some(SceneIndex::new(0)));
        doc.scene = Some(SceneIndex::new(1));
        assert_eq!(doc.default_scene_index(), Some(SceneIndex::new(1)));
    }

    #[test]
    fn test_primitive_attribute_order_and_mode() {
        let json = r#"{"attributes": {"TEXCOORD_0": 2, "POSITION": 0, "NORMAL": 1}}"#;
        let primitive: Primitive = serde_json::from_str(json).unwrap();
        let names: Vec<_> = primitive.attributes.keys().cloned().collect();
        assert_eq!(names, ["TEXCOORD_0", "POSITION", "NORMAL"]);
        assert_eq!(primitive.mode, Mode::Triangles);
        assert_eq!(primitive.get(&Semantic::Position), Some(AccessorIndex::new(0)));
        assert_eq!(primitive.semantics().count(), 3);
    }

    #[test]
    fn test_unknown_mode_rejected() {
        let json = r#"{"attributes": {}, "mode": 9}"#;
        let err = serde_json::from_str::<Primitive>(json).unwrap_err();
        assert!(err.to_string().contains("unknown primitive mode 9"));
    }

    #[test]
    fn test_extension_maps_skip_empty() {
        let json = r#"{
            "asset": {"version": "2.0"},
            "materials": [{}, {"extensions": {"KHR_materials_unlit": {}}}]
        }"#;
        let doc: Document = serde_json::from_str(json).unwrap();
        let maps = doc.extension_maps();
        assert_eq!(maps.len(), 1);
        assert_eq!(maps[0].0, "materials[1]");
    }
}

//! Materials, textures, images and samplers.

use serde::{Deserialize, Serialize};

use crate::extension::Extensions;
use crate::{BufferViewIndex, ImageIndex, SamplerIndex, TextureIndex};

/// A PBR material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Material {
    /// Material name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Metallic-roughness parameters.
    #[serde(default)]
    pub pbr_metallic_roughness: PbrMetallicRoughness,
    /// Tangent-space normal map.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub normal_texture: Option<NormalTextureInfo>,
    /// Ambient occlusion map.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub occlusion_texture: Option<OcclusionTextureInfo>,
    /// Emissive map.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emissive_texture: Option<TextureInfo>,
    /// Emissive color.
    #[serde(default)]
    pub emissive_factor: [f32; 3],
    /// Alpha interpretation.
    #[serde(default)]
    pub alpha_mode: AlphaMode,
    /// Cutoff used by [`AlphaMode::Mask`].
    #[serde(default = "default_alpha_cutoff")]
    pub alpha_cutoff: f32,
    /// Disable back-face culling.
    #[serde(default)]
    pub double_sided: bool,
    #[serde(default, skip_serializing_if = "Extensions::is_empty")]
    pub extensions: Extensions,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extras: Option<serde_json::Value>,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            name: None,
            pbr_metallic_roughness: PbrMetallicRoughness::default(),
            normal_texture: None,
            occlusion_texture: None,
            emissive_texture: None,
            emissive_factor: [0.0; 3],
            alpha_mode: AlphaMode::Opaque,
            alpha_cutoff: default_alpha_cutoff(),
            double_sided: false,
            extensions: Extensions::default(),
            extras: None,
        }
    }
}

impl Material {
    /// Every texture reference in the material, with its slot name.
    pub fn texture_slots(&self) -> Vec<(&'static str, TextureIndex, u32)> {
        let pbr = &self.pbr_metallic_roughness;
        let mut slots = Vec::new();
        if let Some(info) = &pbr.base_color_texture {
            slots.push(("baseColorTexture", info.index, info.tex_coord));
        }
        if let Some(info) = &pbr.metallic_roughness_texture {
            slots.push(("metallicRoughnessTexture", info.index, info.tex_coord));
        }
        if let Some(info) = &self.normal_texture {
            slots.push(("normalTexture", info.index, info.tex_coord));
        }
        if let Some(info) = &self.occlusion_texture {
            slots.push(("occlusionTexture", info.index, info.tex_coord));
        }
        if let Some(info) = &self.emissive_texture {
            slots.push(("emissiveTexture", info.index, info.tex_coord));
        }
        slots
    }
}

fn default_alpha_cutoff() -> f32 {
    0.5
}

/// How the alpha channel of the base color is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AlphaMode {
    #[default]
    Opaque,
    Mask,
    Blend,
}

/// Metallic-roughness parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PbrMetallicRoughness {
    /// Linear base color.
    #[serde(default = "default_base_color_factor")]
    pub base_color_factor: [f32; 4],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_color_texture: Option<TextureInfo>,
    #[serde(default = "one")]
    pub metallic_factor: f32,
    #[serde(default = "one")]
    pub roughness_factor: f32,
    /// Blue channel metalness, green channel roughness.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metallic_roughness_texture: Option<TextureInfo>,
    #[serde(default, skip_serializing_if = "Extensions::is_empty")]
    pub extensions: Extensions,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extras: Option<serde_json::Value>,
}

impl Default for PbrMetallicRoughness {
    fn default() -> Self {
        Self {
            base_color_factor: default_base_color_factor(),
            base_color_texture: None,
            metallic_factor: 1.0,
            roughness_factor: 1.0,
            metallic_roughness_texture: None,
            extensions: Extensions::default(),
            extras: None,
        }
    }
}

fn default_base_color_factor() -> [f32; 4] {
    [1.0, 1.0, 1.0, 1.0]
}

fn one() -> f32 {
    1.0
}

/// Reference to a texture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextureInfo {
    pub index: TextureIndex,
    /// Texture coordinate set (TEXCOORD_n).
    #[serde(default)]
    pub tex_coord: u32,
    #[serde(default, skip_serializing_if = "Extensions::is_empty")]
    pub extensions: Extensions,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extras: Option<serde_json::Value>,
}

/// Reference to a normal map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalTextureInfo {
    pub index: TextureIndex,
    #[serde(default)]
    pub tex_coord: u32,
    /// Scalar applied to the sampled X and Y.
    #[serde(default = "one")]
    pub scale: f32,
    #[serde(default, skip_serializing_if = "Extensions::is_empty")]
    pub extensions: Extensions,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extras: Option<serde_json::Value>,
}

/// Reference to an occlusion map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OcclusionTextureInfo {
    pub index: TextureIndex,
    #[serde(default)]
    pub tex_coord: u32,
    #[serde(default = "one")]
    pub strength: f32,
    #[serde(default, skip_serializing_if = "Extensions::is_empty")]
    pub extensions: Extensions,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extras: Option<serde_json::Value>,
}

/// An image paired with a sampler.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Texture {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sampler: Option<SamplerIndex>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<ImageIndex>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Extensions::is_empty")]
    pub extensions: Extensions,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extras: Option<serde_json::Value>,
}

/// Encoded image data, stored at a URI or in a buffer view.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    /// Required when `buffer_view` is set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buffer_view: Option<BufferViewIndex>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Extensions::is_empty")]
    pub extensions: Extensions,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extras: Option<serde_json::Value>,
}

gl_enum! {
    /// Magnification filter.
    pub enum MagFilter : "magnification filter" {
        Nearest = 9728,
        Linear = 9729,
    }
}

gl_enum! {
    /// Minification filter.
    pub enum MinFilter : "minification filter" {
        Nearest = 9728,
        Linear = 9729,
        NearestMipmapNearest = 9984,
        LinearMipmapNearest = 9985,
        NearestMipmapLinear = 9986,
        LinearMipmapLinear = 9987,
    }
}

impl MinFilter {
    /// Whether the filter samples mip levels.
    pub const fn uses_mipmaps(self) -> bool {
        !matches!(self, Self::Nearest | Self::Linear)
    }
}

gl_enum! {
    /// Texture coordinate wrapping.
    pub enum WrapMode : "wrap mode" {
        ClampToEdge = 33071,
        MirroredRepeat = 33648,
        Repeat = 10497,
    }
}

impl Default for WrapMode {
    fn default() -> Self {
        Self::Repeat
    }
}

/// Texture sampling state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sampler {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mag_filter: Option<MagFilter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_filter: Option<MinFilter>,
    #[serde(default)]
    pub wrap_s: WrapMode,
    #[serde(default)]
    pub wrap_t: WrapMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Extensions::is_empty")]
    pub extensions: Extensions,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extras: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_material_defaults() {
        let material: Material = serde_json::from_str("{}").unwrap();
        assert_eq!(material.alpha_mode, AlphaMode::Opaque);
        assert_eq!(material.alpha_cutoff, 0.5);
        assert_eq!(material.pbr_metallic_roughness.base_color_factor, [1.0; 4]);
        assert_eq!(material.pbr_metallic_roughness.metallic_factor, 1.0);
        assert_eq!(material.emissive_factor, [0.0; 3]);
        assert!(!material.double_sided);
        assert_eq!(material, Material::default());
    }

    #[test]
    fn test_texture_slots() {
        let json = r#"{
            "pbrMetallicRoughness": { "baseColorTexture": { "index": 2, "texCoord": 1 } },
            "normalTexture": { "index": 0, "scale": 0.5 }
        }"#;
        let material: Material = serde_json::from_str(json).unwrap();
        let slots = material.texture_slots();
        assert_eq!(slots.len(), 2);
        assert_eq!(slots[0], ("baseColorTexture", TextureIndex::new(2), 1));
        assert_eq!(material.normal_texture.unwrap().scale, 0.5);
    }

    #[test]
    fn test_alpha_mode_names() {
        let mode: AlphaMode = serde_json::from_str("\"BLEND\"").unwrap();
        assert_eq!(mode, AlphaMode::Blend);
        assert!(serde_json::from_str::<AlphaMode>("\"blend\"").is_err());
    }

    #[test]
    fn test_sampler_codes() {
        let sampler: Sampler =
            serde_json::from_str(r#"{"magFilter": 9729, "minFilter": 9987, "wrapS": 33071}"#).unwrap();
        assert_eq!(sampler.mag_filter, Some(MagFilter::Linear));
        assert_eq!(sampler.min_filter, Some(MinFilter::LinearMipmapLinear));
        assert!(sampler.min_filter.unwrap().uses_mipmaps());
        assert_eq!(sampler.wrap_s, WrapMode::ClampToEdge);
        assert_eq!(sampler.wrap_t, WrapMode::Repeat);

        assert!(serde_json::from_str::<Sampler>(r#"{"wrapS": 1}"#).is_err());
    }
}

//! Opt-in factories for common Khronos extensions.
//!
//! Nothing here is registered by default:
//!
//! ```ignore
//! let mut registry = ExtensionRegistry::new();
//! glint::khr::register_all(&mut registry)?;
//! ```

use glam::{Affine2, Vec2, Vec3, Vec4};
use glint_core::{Document, ExtensionRegistry, GltfError, Result, TextureInfo};
use serde::Deserialize;
use serde_json::Value;

pub const KHR_MATERIALS_PBR_SPECULAR_GLOSSINESS: &str = "KHR_materials_pbrSpecularGlossiness";
pub const KHR_TEXTURE_TRANSFORM: &str = "KHR_texture_transform";

/// `KHR_materials_pbrSpecularGlossiness` on a material.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PbrSpecularGlossiness {
    pub diffuse_factor: Vec4,
    pub diffuse_texture: Option<TextureInfo>,
    pub specular_factor: Vec3,
    pub glossiness_factor: f32,
    pub specular_glossiness_texture: Option<TextureInfo>,
}

impl Default for PbrSpecularGlossiness {
    fn default() -> Self {
        Self {
            diffuse_factor: Vec4::ONE,
            diffuse_texture: None,
            specular_factor: Vec3::ONE,
            glossiness_factor: 1.0,
            specular_glossiness_texture: None,
        }
    }
}

/// `KHR_texture_transform` on a texture reference.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TextureTransform {
    pub offset: Vec2,
    /// Radians, counter-clockwise in UV space.
    pub rotation: f32,
    pub scale: Vec2,
    /// Overrides the texture reference's `texCoord`.
    pub tex_coord: Option<u32>,
}

impl Default for TextureTransform {
    fn default() -> Self {
        Self {
            offset: Vec2::ZERO,
            rotation: 0.0,
            scale: Vec2::ONE,
            tex_coord: None,
        }
    }
}

impl TextureTransform {
    /// UV transform `T * R * S`.
    pub fn to_affine2(&self) -> Affine2 {
        Affine2::from_scale_angle_translation(self.scale, -self.rotation, self.offset)
    }
}

fn parse<T: for<'de> Deserialize<'de>>(name: &str, raw: &Value) -> Result<T> {
    T::deserialize(raw).map_err(|e| GltfError::schema(format!("{}: {}", name, e)))
}

fn check_texture(name: &str, info: Option<&TextureInfo>, document: &Document) -> Result<()> {
    match info {
        Some(info) => document.require(info.index, name).map(drop),
        None => Ok(()),
    }
}

/// Factory for [`PbrSpecularGlossiness`]. Texture references are range checked.
pub fn pbr_specular_glossiness(raw: &Value, document: &Document) -> Result<PbrSpecularGlossiness> {
    let ext: PbrSpecularGlossiness = parse(KHR_MATERIALS_PBR_SPECULAR_GLOSSINESS, raw)?;
    check_texture(
        KHR_MATERIALS_PBR_SPECULAR_GLOSSINESS,
        ext.diffuse_texture.as_ref(),
        document,
    )?;
    check_texture(
        KHR_MATERIALS_PBR_SPECULAR_GLOSSINESS,
        ext.specular_glossiness_texture.as_ref(),
        document,
    )?;
    Ok(ext)
}

/// Factory for [`TextureTransform`].
pub fn texture_transform(raw: &Value, _document: &Document) -> Result<TextureTransform> {
    parse(KHR_TEXTURE_TRANSFORM, raw)
}

/// Register every factory in this module.
pub fn register_all(registry: &mut ExtensionRegistry) -> Result<()> {
    registry.register_fn(KHR_MATERIALS_PBR_SPECULAR_GLOSSINESS, pbr_specular_glossiness)?;
    registry.register_fn(KHR_TEXTURE_TRANSFORM, texture_transform)?;
    Ok(())
}

//! Core types for glint: the glTF 2.0 document model, typed indices,
//! errors and the extension registry.
//!
//! The document model mirrors the glTF JSON schema. It is produced by
//! `glint-parser` and consumed read-only by the resolver and scene builder.

#[macro_use]
mod macros;

pub mod accessor;
pub mod animation;
pub mod document;
pub mod errors;
pub mod extension;
pub mod index;
pub mod material;
pub mod semantic;

pub use accessor::{
    Accessor, Buffer, BufferView, ComponentType, ElementType, Sparse, SparseIndices, SparseValues,
};
pub use animation::{
    Animation, AnimationSampler, Camera, CameraType, Channel, Interpolation, Orthographic, Path,
    Perspective, Skin, Target,
};
pub use document::{Asset, Document, Element, Mesh, Mode, Node, Primitive, Scene};
pub use errors::{GltfError, Result};
pub use extension::{
    ExtensionEntry, ExtensionFactory, ExtensionPayload, ExtensionRegistry, Extensions, FnFactory,
};
pub use index::Index;
pub use material::{
    AlphaMode, Image, MagFilter, Material, MinFilter, NormalTextureInfo, OcclusionTextureInfo,
    PbrMetallicRoughness, Sampler, Texture, TextureInfo, WrapMode,
};
pub use semantic::Semantic;

pub type SceneIndex = Index<Scene>;
pub type NodeIndex = Index<Node>;
pub type MeshIndex = Index<Mesh>;
pub type AccessorIndex = Index<Accessor>;
pub type BufferViewIndex = Index<BufferView>;
pub type BufferIndex = Index<Buffer>;
pub type MaterialIndex = Index<Material>;
pub type TextureIndex = Index<Texture>;
pub type ImageIndex = Index<Image>;
pub type SamplerIndex = Index<Sampler>;
pub type SkinIndex = Index<Skin>;
pub type CameraIndex = Index<Camera>;
pub type AnimationIndex = Index<Animation>;

//! glint: read glTF 2.0 assets.
//!
//! The [`Importer`] parses a `.gltf` or `.glb` asset, builds the scene graph
//! of the selected scene and hands back a [`Resolver`] that materializes
//! buffers, accessors and images on demand.
//!
//! # Quick Start
//!
//! ```ignore
//! use glint::{Importer, ReadOptions};
//!
//! let import = Importer::new().import_file("scene.gltf", &ReadOptions::default())?;
//! for (_, node, binding) in import.scene()?.mesh_instances() {
//!     for primitive in &binding.primitives {
//!         let data = import.resolver.primitive(binding.mesh, primitive.index)?;
//!         println!("{:?}: {} vertices", node.name, data.vertex_count());
//!     }
//! }
//! ```
//!
//! # Crates
//!
//! ```text
//! glint-core      document model, errors, extension registry
//! glint-parser    container reader, document parser, validation
//! glint-resolver  buffers, accessors, images
//! glint-scene     scene graph
//! ```

pub mod error;
pub mod import;
pub mod khr;
pub mod options;

pub use error::{ImportError, Result};
pub use import::{Import, Importer};
pub use options::ReadOptions;

pub use glint_core as core;
pub use glint_core::{Document, ExtensionRegistry, GltfError};
pub use glint_parser::{parse_container, parse_gltf, ContainerKind, DocumentParser, Gltf};
pub use glint_resolver::{
    ByteSource, ComponentData, FileSystemSource, MemorySource, NoSource, PrimitiveData, Resolver,
    TypedArray,
};
pub use glint_scene::{build_scene_graph, SceneGraph, Transform};

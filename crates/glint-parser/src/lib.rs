//! Reading glTF containers and documents.
//!
//! [`parse_container`] splits `.gltf`/`.glb` bytes into JSON and binary
//! chunks; [`DocumentParser`] turns the JSON into a validated
//! [`Document`](glint_core::Document). [`parse_gltf`] does both.

pub mod container;
pub mod parser;
pub mod validate;

pub use container::{parse_container, write_glb, Container, ContainerKind};
pub use parser::{parse_gltf, DocumentParser, Gltf};
pub use validate::validate;

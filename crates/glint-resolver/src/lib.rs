//! Resolution of glTF binary contents.
//!
//! A parsed [`Document`](glint_core::Document) only describes where its data
//! lives. This crate fetches buffers (binary chunk, data URI or external file
//! through a [`ByteSource`]), decodes accessors into [`TypedArray`]s and loads
//! encoded images. [`Resolver`] ties it together with write-once caches so
//! each item is produced at most once.

pub mod accessor;
pub mod buffer;
pub mod cache;
pub mod image;
pub mod mesh;
pub mod resolver;
pub mod source;
pub mod uri;

pub use accessor::{decode_accessor, decode_indices, ComponentData, TypedArray};
pub use buffer::{resolve_buffer, view_slice, BufferCache, BufferLookup};
pub use cache::IndexCache;
pub use image::{resolve_image, sniff_mime, ImageData};
pub use mesh::{read_primitive, PrimitiveData};
pub use resolver::Resolver;
pub use source::{ByteSource, FileSystemSource, MemorySource, NoSource, SourceError};

//! The resolver: lazily materialized buffers, images and accessors of one document.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use glint_core::{AccessorIndex, BufferIndex, Document, ImageIndex, MeshIndex, Result};

use crate::accessor::{decode_accessor, indices_from, TypedArray};
use crate::buffer::{resolve_buffer, BufferCache, BufferLookup};
use crate::cache::IndexCache;
use crate::image::{resolve_image, ImageData};
use crate::mesh::{read_primitive, PrimitiveData};
use crate::source::{ByteSource, NoSource};

/// Lazily resolves the binary contents of a parsed document.
///
/// Every buffer, image and accessor is produced at most once and kept for the
/// resolver's lifetime, failures included. The resolver is `Send + Sync`;
/// concurrent requests for the same index wait for the first one.
pub struct Resolver {
    document: Arc<Document>,
    chunks: Vec<Vec<u8>>,
    base_dir: PathBuf,
    source: Arc<dyn ByteSource>,
    buffers: BufferCache,
    images: IndexCache<Arc<ImageData>>,
    accessors: IndexCache<Arc<TypedArray>>,
}

impl Resolver {
    /// A resolver over `document` with the given binary chunks.
    ///
    /// External reads are refused until a source is set with
    /// [`Resolver::with_source`].
    pub fn new(document: impl Into<Arc<Document>>, chunks: Vec<Vec<u8>>) -> Self {
        let document = document.into();
        Self {
            buffers: IndexCache::new("buffer", document.buffers.len()),
            images: IndexCache::new("image", document.images.len()),
            accessors: IndexCache::new("accessor", document.accessors.len()),
            document,
            chunks,
            base_dir: PathBuf::new(),
            source: Arc::new(NoSource),
        }
    }

    /// Directory relative URIs are resolved against.
    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = base_dir.into();
        self
    }

    pub fn with_source(mut self, source: Arc<dyn ByteSource>) -> Self {
        self.source = source;
        self
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Shared handle to the document.
    pub fn document_arc(&self) -> Arc<Document> {
        Arc::clone(&self.document)
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Decoded accessor `index`.
    pub fn accessor(&self, index: AccessorIndex) -> Result<Arc<TypedArray>> {
        self.accessors
            .get_or_resolve(index.value(), || {
                decode_accessor(&self.document, index, self).map(Arc::new)
            })
            .cloned()
    }

    /// Accessor `index` as vertex indices.
    pub fn indices(&self, index: AccessorIndex) -> Result<Vec<u32>> {
        let array = self.accessor(index)?;
        indices_from(&array, index.value())
    }

    /// Encoded bytes of image `index`.
    pub fn image(&self, index: ImageIndex) -> Result<Arc<ImageData>> {
        self.images
            .get_or_resolve(index.value(), || {
                resolve_image(
                    &self.document,
                    index,
                    self,
                    &self.base_dir,
                    self.source.as_ref(),
                )
                .map(Arc::new)
            })
            .cloned()
    }

    /// Vertex streams of one primitive.
    pub fn primitive(&self, mesh: MeshIndex, primitive: usize) -> Result<PrimitiveData> {
        read_primitive(&self.document, mesh, primitive, |index| self.accessor(index))
    }

    /// Number of buffers fetched so far, successfully or not.
    pub fn resolved_buffers(&self) -> usize {
        self.buffers.resolved()
    }

    /// Resolve every buffer and image and decode every accessor, stopping at
    /// the first failure.
    pub fn resolve_all(&self) -> Result<()> {
        for index in (0..self.buffers.len()).filter_map(BufferIndex::from_position) {
            self.buffer(index)?;
        }
        for index in (0..self.accessors.len()).filter_map(AccessorIndex::from_position) {
            self.accessor(index)?;
        }
        for index in (0..self.images.len()).filter_map(ImageIndex::from_position) {
            self.image(index)?;
        }
        Ok(())
    }

    /// [`Resolver::resolve_all`] on the rayon pool. Buffers are fetched
    /// before any accessor is decoded.
    #[cfg(feature = "parallel")]
    pub fn resolve_all_parallel(&self) -> Result<()> {
        use rayon::prelude::*;

        (0..self.buffers.len())
            .into_par_iter()
            .filter_map(BufferIndex::from_position)
            .try_for_each(|index| self.buffer(index).map(drop))?;
        (0..self.accessors.len())
            .into_par_iter()
            .filter_map(AccessorIndex::from_position)
            .try_for_each(|index| self.accessor(index).map(drop))?;
        (0..self.images.len())
            .into_par_iter()
            .filter_map(ImageIndex::from_position)
            .try_for_each(|index| self.image(index).map(drop))?;
        log::debug!(
            "resolved {} buffers and {} accessors in parallel",
            self.buffers.len(),
            self.accessors.len()
        );
        Ok(())
    }
}

impl BufferLookup for Resolver {
    fn buffer(&self, index: BufferIndex) -> Result<&[u8]> {
        let bytes = self.buffers.get_or_resolve(index.value(), || {
            let buffer = self.document.require(index, "buffer request")?;
            resolve_buffer(
                index,
                buffer,
                &self.chunks,
                &self.base_dir,
                self.source.as_ref(),
            )
            .map(Arc::from)
        })?;
        Ok(&bytes[..])
    }
}

impl std::fmt::Debug for Resolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolver")
            .field("base_dir", &self.base_dir)
            .field("chunks", &self.chunks.len())
            .field("buffers", &self.buffers)
            .field("images", &self.images)
            .field("accessors", &self.accessors)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{MemorySource, SourceError};
    use glint_core::GltfError;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts reads passed through to an inner source.
    struct CountingSource {
        inner: MemorySource,
        reads: AtomicUsize,
    }

    impl ByteSource for CountingSource {
        fn read(&self, path: &Path) -> std::result::Result<Vec<u8>, SourceError> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            self.inner.read(path)
        }
    }

    fn counting(files: &[(&str, Vec<u8>)]) -> Arc<CountingSource> {
        let inner = MemorySource::new();
        for (path, data) in files {
            inner.insert(*path, data.clone());
        }
        Arc::new(CountingSource {
            inner,
            reads: AtomicUsize::new(0),
        })
    }

    fn document() -> Document {
        serde_json::from_value(json!({
            "asset": {"version": "2.0"},
            "buffers": [{"byteLength": 8, "uri": "data.bin"}],
            "bufferViews": [{"buffer": 0, "byteLength": 8}],
            "accessors": [
                {"bufferView": 0, "componentType": 5126, "count": 2, "type": "SCALAR"},
                {"bufferView": 0, "byteOffset": 4, "componentType": 5126, "count": 1, "type": "SCALAR"}
            ]
        }))
        .unwrap()
    }

    fn data() -> Vec<u8> {
        [1.5f32, 2.5].iter().flat_map(|v| v.to_le_bytes()).collect()
    }

    #[test]
    fn test_buffer_fetched_once() {
        let source = counting(&[("assets/data.bin", data())]);
        let resolver = Resolver::new(document(), Vec::new())
            .with_base_dir("assets")
            .with_source(source.clone());

        assert_eq!(resolver.accessor(AccessorIndex::new(0)).unwrap().to_f32(), vec![1.5, 2.5]);
        assert_eq!(resolver.accessor(AccessorIndex::new(1)).unwrap().to_f32(), vec![2.5]);
        resolver.resolve_all().unwrap();

        assert_eq!(source.reads.load(Ordering::SeqCst), 1);
        assert_eq!(resolver.resolved_buffers(), 1);
    }

    #[test]
    fn test_failure_fetched_once() {
        let source = counting(&[]);
        let resolver = Resolver::new(document(), Vec::new()).with_source(source.clone());

        for _ in 0..3 {
            let err = resolver.accessor(AccessorIndex::new(0)).unwrap_err();
            assert!(matches!(err, GltfError::BufferNotFound { .. }));
        }
        assert!(resolver.resolve_all().is_err());
        assert_eq!(source.reads.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_concurrent_requests() {
        let source = counting(&[("data.bin", data())]);
        let resolver = Resolver::new(document(), Vec::new()).with_source(source.clone());

        std::thread::scope(|scope| {
            for i in 0..8 {
                let resolver = &resolver;
                scope.spawn(move || {
                    resolver.accessor(AccessorIndex::new(i % 2)).unwrap();
                });
            }
        });
        assert_eq!(source.reads.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_unknown_accessor() {
        let resolver = Resolver::new(document(), Vec::new());
        assert!(matches!(
            resolver.accessor(AccessorIndex::new(9)),
            Err(GltfError::ReferenceOutOfRange { index: 9, .. })
        ));
    }

    #[test]
    fn test_binary_chunk_from_parser() {
        let json = br#"{
            "asset": {"version": "2.0"},
            "buffers": [{"byteLength": 4}],
            "bufferViews": [{"buffer": 0, "byteLength": 4}],
            "accessors": [{"bufferView": 0, "componentType": 5121, "count": 4, "type": "SCALAR"}]
        }"#;
        let glb = glint_parser::write_glb(json, Some(&[3, 1, 4, 1]));
        let gltf = glint_parser::parse_gltf(&glb, &Default::default()).unwrap();
        let resolver = Resolver::new(gltf.document, gltf.chunks);
        assert_eq!(
            resolver.indices(AccessorIndex::new(0)).unwrap(),
            vec![3, 1, 4, 1]
        );
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_parallel_resolve() {
        let source = counting(&[("data.bin", data())]);
        let resolver = Resolver::new(document(), Vec::new()).with_source(source.clone());
        resolver.resolve_all_parallel().unwrap();
        assert_eq!(source.reads.load(Ordering::SeqCst), 1);
        assert_eq!(resolver.accessor(AccessorIndex::new(1)).unwrap().to_f32(), vec![2.5]);
    }
}

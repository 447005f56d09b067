//! One-call import: container, document, resolver and scene graph.

use std::path::Path;
use std::sync::Arc;

use glint_core::{Document, ExtensionRegistry, GltfError};
use glint_parser::{parse_gltf, ContainerKind};
use glint_resolver::{ByteSource, FileSystemSource, Resolver};
use glint_scene::{build_scene_graph, SceneGraph};

use crate::error::{ImportError, Result};
use crate::options::ReadOptions;

/// A parsed asset with lazy access to its contents.
#[derive(Debug)]
pub struct Import {
    /// Layout the asset was read from.
    pub kind: ContainerKind,
    pub resolver: Resolver,
    /// The selected scene; `None` when the document declares no scenes.
    pub graph: Option<SceneGraph>,
}

impl Import {
    pub fn document(&self) -> &Document {
        self.resolver.document()
    }

    /// The scene graph, or [`GltfError::NoScene`].
    pub fn scene(&self) -> std::result::Result<&SceneGraph, GltfError> {
        self.graph.as_ref().ok_or(GltfError::NoScene)
    }
}

/// Reads glTF assets with a fixed extension registry and byte source.
pub struct Importer {
    registry: ExtensionRegistry,
    source: Arc<dyn ByteSource>,
}

impl Default for Importer {
    fn default() -> Self {
        Self {
            registry: ExtensionRegistry::new(),
            source: Arc::new(FileSystemSource),
        }
    }
}

impl Importer {
    /// An importer with no extension factories that reads external files
    /// from the file system.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_registry(mut self, registry: ExtensionRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Where external buffers and images come from.
    pub fn with_source(mut self, source: Arc<dyn ByteSource>) -> Self {
        self.source = source;
        self
    }

    pub fn registry(&self) -> &ExtensionRegistry {
        &self.registry
    }

    /// Import a `.gltf` or `.glb` asset held in memory.
    pub fn import(&self, bytes: &[u8], options: &ReadOptions) -> Result<Import> {
        let gltf = parse_gltf(bytes, &self.registry)?;
        let kind = gltf.kind;

        let graph = if gltf.document.scenes.is_empty() {
            log::debug!("document declares no scenes; skipping scene graph");
            None
        } else {
            Some(build_scene_graph(&gltf.document, options.scene)?)
        };

        let mut resolver =
            Resolver::new(gltf.document, gltf.chunks).with_source(Arc::clone(&self.source));
        if let Some(base_dir) = &options.base_dir {
            resolver = resolver.with_base_dir(base_dir);
        }

        if options.preload {
            preload(&resolver, options.parallel)?;
        }

        Ok(Import {
            kind,
            resolver,
            graph,
        })
    }

    /// Import the asset at `path` through the byte source. Relative URIs
    /// resolve against the file's directory unless `options.base_dir` is set.
    pub fn import_file(&self, path: impl AsRef<Path>, options: &ReadOptions) -> Result<Import> {
        let path = path.as_ref();
        let bytes = self.source.read(path).map_err(|source| ImportError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("importing {} ({} bytes)", path.display(), bytes.len());

        let mut options = options.clone();
        if options.base_dir.is_none() {
            options.base_dir = path.parent().map(Path::to_path_buf);
        }
        self.import(&bytes, &options)
    }
}

fn preload(resolver: &Resolver, parallel: bool) -> std::result::Result<(), GltfError> {
    #[cfg(feature = "parallel")]
    if parallel {
        return resolver.resolve_all_parallel();
    }
    #[cfg(not(feature = "parallel"))]
    if parallel {
        log::warn!("parallel preload requested but glint was built without the `parallel` feature");
    }
    resolver.resolve_all()
}

impl std::fmt::Debug for Importer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Importer")
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

//! Error types for the import facade.

use std::path::PathBuf;

use glint_core::GltfError;
use glint_resolver::SourceError;
use thiserror::Error;

/// Result type for import operations.
pub type Result<T> = std::result::Result<T, ImportError>;

/// Errors raised by [`Importer`](crate::Importer).
#[derive(Debug, Error)]
pub enum ImportError {
    /// The asset file itself could not be read.
    #[error("cannot open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: SourceError,
    },

    /// Reading, resolving or building the asset failed.
    #[error(transparent)]
    Gltf(#[from] GltfError),
}

impl ImportError {
    /// The underlying glTF error, if any.
    pub fn as_gltf(&self) -> Option<&GltfError> {
        match self {
            Self::Gltf(err) => Some(err),
            Self::Open { .. } => None,
        }
    }
}

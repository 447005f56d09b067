//! Error types for glint.

use thiserror::Error;

/// Result type for glint operations.
pub type Result<T> = std::result::Result<T, GltfError>;

/// Errors raised while reading, resolving or building a glTF asset.
///
/// Every variant is fatal for the call that produced it. The two I/O
/// variants ([`GltfError::BufferNotFound`], [`GltfError::ImageNotFound`]) are
/// the only ones worth retrying; see [`GltfError::is_io`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GltfError {
    /// The binary container header or chunk table is invalid.
    #[error("malformed container: {reason}")]
    MalformedContainer { reason: String },

    /// The JSON document violates the glTF schema.
    #[error("schema violation: {message}")]
    SchemaViolation { message: String },

    /// A cross reference points past the end of its target array.
    #[error("{referrer} references {target} {index}, but the document has {len}")]
    ReferenceOutOfRange {
        referrer: String,
        target: &'static str,
        index: usize,
        len: usize,
    },

    /// A buffer without URI has no binary chunk to draw from.
    #[error("buffer {buffer} has no uri and no binary chunk is available")]
    MissingBinaryChunk { buffer: usize },

    /// A base64 data URI could not be decoded.
    #[error("invalid base64 data uri: {message}")]
    InvalidBase64 { message: String },

    /// The byte source could not supply an external buffer.
    #[error("buffer not found: {uri} ({reason})")]
    BufferNotFound { uri: String, reason: String },

    /// Decoding an accessor would read outside its view or buffer.
    #[error("accessor {accessor} out of bounds: {reason}")]
    AccessorBoundsError { accessor: usize, reason: String },

    /// Index data is not representable as vertex indices.
    #[error("corrupt index data in accessor {accessor}: {reason}")]
    CorruptIndexData { accessor: usize, reason: String },

    /// The document declares no scenes.
    #[error("document declares no scenes")]
    NoScene,

    /// A node is reachable from itself.
    #[error("cyclic node graph: {}", format_path(.path))]
    CyclicNodeGraph { path: Vec<usize> },

    /// An extension factory is already registered under this name.
    #[error("extension already registered: {name}")]
    DuplicateExtension { name: String },

    /// The byte source could not supply an external image.
    #[error("image not found: {uri} ({reason})")]
    ImageNotFound { uri: String, reason: String },
}

fn format_path(path: &[usize]) -> String {
    path.iter()
        .map(|node| format!("node {}", node))
        .collect::<Vec<_>>()
        .join(" -> ")
}

impl GltfError {
    /// Create a malformed-container error.
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedContainer {
            reason: reason.into(),
        }
    }

    /// Create a schema violation.
    pub fn schema(message: impl Into<String>) -> Self {
        Self::SchemaViolation {
            message: message.into(),
        }
    }

    /// Create an out-of-range reference error.
    pub fn out_of_range(
        referrer: impl Into<String>,
        target: &'static str,
        index: usize,
        len: usize,
    ) -> Self {
        Self::ReferenceOutOfRange {
            referrer: referrer.into(),
            target,
            index,
            len,
        }
    }

    /// Create an accessor bounds error.
    pub fn accessor_bounds(accessor: usize, reason: impl Into<String>) -> Self {
        Self::AccessorBoundsError {
            accessor,
            reason: reason.into(),
        }
    }

    /// Create a corrupt index data error.
    pub fn corrupt_indices(accessor: usize, reason: impl Into<String>) -> Self {
        Self::CorruptIndexData {
            accessor,
            reason: reason.into(),
        }
    }

    /// Whether the error came from the external byte source.
    ///
    /// I/O failures leave the parsed document valid, so a caller may retry
    /// resolution without parsing again.
    pub fn is_io(&self) -> bool {
        matches!(
            self,
            Self::BufferNotFound { .. } | Self::ImageNotFound { .. }
        )
    }
}

impl From<serde_json::Error> for GltfError {
    fn from(err: serde_json::Error) -> Self {
        Self::schema(err.to_string())
    }
}

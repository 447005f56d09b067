//! Materializing buffer contents.

use std::path::Path;
use std::sync::Arc;

use glint_core::{Buffer, BufferIndex, BufferView, Document, GltfError, Result};

use crate::cache::IndexCache;
use crate::source::ByteSource;
use crate::uri::{classify, Location};

/// Memoized buffer contents, one cell per buffer index.
pub type BufferCache = IndexCache<Arc<[u8]>>;

/// Access to resolved buffer bytes by index.
pub trait BufferLookup {
    /// Bytes of buffer `index`, at most `byteLength` long.
    fn buffer(&self, index: BufferIndex) -> Result<&[u8]>;
}

impl BufferLookup for [Vec<u8>] {
    fn buffer(&self, index: BufferIndex) -> Result<&[u8]> {
        self.get(index.value())
            .map(Vec::as_slice)
            .ok_or_else(|| GltfError::out_of_range("lookup", "buffer", index.value(), self.len()))
    }
}

impl BufferLookup for Vec<Vec<u8>> {
    fn buffer(&self, index: BufferIndex) -> Result<&[u8]> {
        self.as_slice().buffer(index)
    }
}

/// Fetch the bytes of one buffer.
///
/// A buffer without a URI takes the first binary chunk and is only valid as
/// buffer 0. Data URIs are decoded inline; anything else is read from
/// `base_dir` through `source`. Results longer than `byteLength` (GLB chunk
/// padding) are truncated.
pub fn resolve_buffer(
    index: BufferIndex,
    buffer: &Buffer,
    chunks: &[Vec<u8>],
    base_dir: &Path,
    source: &dyn ByteSource,
) -> Result<Vec<u8>> {
    let mut bytes = match &buffer.uri {
        None => {
            let chunk = chunks.first().filter(|_| index.value() == 0);
            chunk
                .cloned()
                .ok_or(GltfError::MissingBinaryChunk {
                    buffer: index.value(),
                })?
        }
        Some(uri) => match classify(uri)? {
            Location::Data(data) => data.decode()?,
            Location::Path(path) => {
                let path = base_dir.join(&*path);
                source.read(&path).map_err(|e| GltfError::BufferNotFound {
                    uri: uri.clone(),
                    reason: e.to_string(),
                })?
            }
            Location::Remote(_) => {
                return Err(GltfError::BufferNotFound {
                    uri: uri.clone(),
                    reason: "remote uris are not fetched".to_string(),
                })
            }
        },
    };

    if bytes.len() < buffer.byte_length {
        return Err(GltfError::schema(format!(
            "buffers[{}] declares {} bytes but only {} are available",
            index.value(),
            buffer.byte_length,
            bytes.len()
        )));
    }
    bytes.truncate(buffer.byte_length);

    log::debug!("resolved buffer {} ({} bytes)", index.value(), bytes.len());
    Ok(bytes)
}

/// The bytes a buffer view covers, or `None` if it reaches past `buffer`.
pub fn view_slice<'a>(view: &BufferView, buffer: &'a [u8]) -> Option<&'a [u8]> {
    buffer.get(view.byte_offset..view.end())
}

/// Resolve a buffer view through `buffers`, reporting overruns with `overrun`.
pub(crate) fn view_bytes<'b, B>(
    document: &Document,
    view: &BufferView,
    buffers: &'b B,
    overrun: impl FnOnce(String) -> GltfError,
) -> Result<&'b [u8]>
where
    B: BufferLookup + ?Sized,
{
    document.require(view.buffer, "bufferView")?;
    let buffer = buffers.buffer(view.buffer)?;
    view_slice(view, buffer).ok_or_else(|| {
        overrun(format!(
            "buffer view spans bytes {}..{} of buffer {} which has {}",
            view.byte_offset,
            view.end(),
            view.buffer.value(),
            buffer.len()
        ))
    })
}

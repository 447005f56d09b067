//! Encoded image payloads.

use std::path::Path;

use glint_core::{Document, GltfError, Image, ImageIndex, Result};

use crate::buffer::{view_bytes, BufferLookup};
use crate::source::ByteSource;
use crate::uri::{classify, Location};

const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1A, b'\n'];
const JPEG_MAGIC: &[u8] = &[0xFF, 0xD8, 0xFF];
const FALLBACK_MIME: &str = "application/octet-stream";

/// The still-encoded bytes of an image and their media type.
///
/// glint does not decode pixels; `bytes` is a PNG, JPEG or whatever the
/// asset carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// Guess a media type from the leading bytes.
pub fn sniff_mime(bytes: &[u8]) -> Option<&'static str> {
    if bytes.starts_with(PNG_MAGIC) {
        Some("image/png")
    } else if bytes.starts_with(JPEG_MAGIC) {
        Some("image/jpeg")
    } else {
        None
    }
}

/// Load image `index` from a data URI, a buffer view or the byte source.
///
/// The declared `mimeType` wins; otherwise the type of a data URI, then the
/// sniffed magic bytes, then `application/octet-stream`.
pub fn resolve_image<B>(
    document: &Document,
    index: ImageIndex,
    buffers: &B,
    base_dir: &Path,
    source: &dyn ByteSource,
) -> Result<ImageData>
where
    B: BufferLookup + ?Sized,
{
    let image = document.require(index, "image request")?;
    let id = index.value();

    let (bytes, uri_mime) = match (&image.uri, image.buffer_view) {
        (Some(uri), _) => load_uri(uri, base_dir, source)?,
        (None, Some(view_index)) => {
            let view = document.require(view_index, "image")?;
            let bytes = view_bytes(document, view, buffers, |reason| {
                GltfError::schema(format!("images[{}]: {}", id, reason))
            })?;
            (bytes.to_vec(), None)
        }
        (None, None) => {
            return Err(GltfError::schema(format!(
                "images[{}] has neither uri nor bufferView",
                id
            )))
        }
    };

    let mime_type = declared_mime(image)
        .or(uri_mime)
        .or_else(|| sniff_mime(&bytes).map(str::to_string))
        .unwrap_or_else(|| FALLBACK_MIME.to_string());

    log::debug!("resolved image {} ({}, {} bytes)", id, mime_type, bytes.len());
    Ok(ImageData { mime_type, bytes })
}

fn declared_mime(image: &Image) -> Option<String> {
    image.mime_type.clone().filter(|m| !m.is_empty())
}

fn load_uri(uri: &str, base_dir: &Path, source: &dyn ByteSource) -> Result<(Vec<u8>, Option<String>)> {
    match classify(uri)? {
        Location::Data(data) => {
            let mime = Some(data.mime_type.to_string()).filter(|m| !m.is_empty());
            Ok((data.decode()?, mime))
        }
        Location::Path(path) => {
            let path = base_dir.join(&*path);
            let bytes = source.read(&path).map_err(|e| GltfError::ImageNotFound {
                uri: uri.to_string(),
                reason: e.to_string(),
            })?;
            Ok((bytes, None))
        }
        Location::Remote(_) => Err(GltfError::ImageNotFound {
            uri: uri.to_string(),
            reason: "remote uris are not fetched".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{MemorySource, NoSource};
    use serde_json::json;

    fn png() -> Vec<u8> {
        let mut bytes = PNG_MAGIC.to_vec();
        bytes.extend([0, 0, 0, 13]);
        bytes
    }

    fn document(images: serde_json::Value) -> Document {
        serde_json::from_value(json!({
            "asset": {"version": "2.0"},
            "buffers": [{"byteLength": 16}],
            "bufferViews": [{"buffer": 0, "byteOffset": 4, "byteLength": 12}],
            "images": images
        }))
        .unwrap()
    }

    #[test]
    fn test_sniff() {
        assert_eq!(sniff_mime(&png()), Some("image/png"));
        assert_eq!(sniff_mime(&[0xFF, 0xD8, 0xFF, 0xE0]), Some("image/jpeg"));
        assert_eq!(sniff_mime(b"GIF89a"), None);
    }

    #[test]
    fn test_external_image_sniffed() {
        let source = MemorySource::new().with_file("tex/albedo.png", png());
        let doc = document(json!([{"uri": "albedo.png"}]));
        let image =
            resolve_image(&doc, ImageIndex::new(0), &Vec::<Vec<u8>>::new(), Path::new("tex"), &source)
                .unwrap();
        assert_eq!(image.mime_type, "image/png");
        assert_eq!(image.bytes, png());
    }

    #[test]
    fn test_buffer_view_image() {
        let mut buffer = vec![0; 4];
        buffer.extend(png());
        let doc = document(json!([{"bufferView": 0, "mimeType": "image/png"}]));
        let image =
            resolve_image(&doc, ImageIndex::new(0), &vec![buffer], Path::new(""), &NoSource).unwrap();
        assert_eq!(image.bytes, png());
        assert_eq!(image.mime_type, "image/png");
    }

    #[test]
    fn test_data_uri_mime() {
        let doc = document(json!([{"uri": "data:image/ktx2;base64,AAECAw=="}]));
        let image =
            resolve_image(&doc, ImageIndex::new(0), &Vec::<Vec<u8>>::new(), Path::new(""), &NoSource)
                .unwrap();
        assert_eq!(image.mime_type, "image/ktx2");
        assert_eq!(image.bytes, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_unknown_bytes_fallback() {
        let source = MemorySource::new().with_file("a.bin", vec![1, 2, 3]);
        let doc = document(json!([{"uri": "a.bin"}]));
        let image =
            resolve_image(&doc, ImageIndex::new(0), &Vec::<Vec<u8>>::new(), Path::new(""), &source)
                .unwrap();
        assert_eq!(image.mime_type, FALLBACK_MIME);
    }

    #[test]
    fn test_missing_image() {
        let doc = document(json!([{"uri": "missing.png"}]));
        let err =
            resolve_image(&doc, ImageIndex::new(0), &Vec::<Vec<u8>>::new(), Path::new(""), &NoSource)
                .unwrap_err();
        assert!(matches!(err, GltfError::ImageNotFound { ref uri, .. } if uri == "missing.png"));
        assert!(err.is_io());
    }
}

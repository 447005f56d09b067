//! The binary container (GLB) layout.
//!
//! A GLB file is a 12-byte header followed by chunks:
//!
//! ```text
//! magic:u32 "glTF" | version:u32 | totalLength:u32
//! chunkLength:u32 | chunkType:u32 | chunkData[chunkLength]   (repeated)
//! ```
//!
//! All integers are little-endian. The first chunk holds the JSON document;
//! BIN chunks hold buffer data.

use glint_core::{GltfError, Result};

/// GLB magic number ("glTF" in little-endian).
pub const GLB_MAGIC: u32 = 0x46546C67;
/// The only container version glint reads.
pub const GLB_VERSION: u32 = 2;
/// JSON chunk type ("JSON" in little-endian).
pub const CHUNK_JSON: u32 = 0x4E4F534A;
/// Binary chunk type ("BIN\0" in little-endian).
pub const CHUNK_BIN: u32 = 0x004E4942;

const HEADER_LEN: usize = 12;
const CHUNK_HEADER_LEN: usize = 8;
const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Which of the two container layouts was read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    /// A plain `.gltf` JSON document.
    Json,
    /// A `.glb` binary container.
    Binary,
}

/// A container split into its JSON document and binary chunks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Container<'a> {
    pub kind: ContainerKind,
    /// Header version; `None` for plain JSON.
    pub version: Option<u32>,
    /// The JSON document bytes.
    pub json: &'a [u8],
    /// BIN chunks in file order. Empty for plain JSON.
    pub chunks: Vec<&'a [u8]>,
}

impl<'a> Container<'a> {
    /// The chunk that backs buffer 0, if any.
    pub fn binary_chunk(&self) -> Option<&'a [u8]> {
        self.chunks.first().copied()
    }
}

/// Split `bytes` into JSON and binary chunks.
///
/// Input whose first non-whitespace byte (after an optional UTF-8 BOM) is `{`
/// is taken as a plain JSON document. Anything else must be a well formed GLB.
pub fn parse_container(bytes: &[u8]) -> Result<Container<'_>> {
    let text = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    if text.iter().find(|b| !b.is_ascii_whitespace()) == Some(&b'{') {
        return Ok(Container {
            kind: ContainerKind::Json,
            version: None,
            json: text,
            chunks: Vec::new(),
        });
    }

    if bytes.len() < HEADER_LEN {
        return Err(GltfError::malformed(format!(
            "container is {} bytes, shorter than the {}-byte header",
            bytes.len(),
            HEADER_LEN
        )));
    }

    let magic = read_u32(bytes, 0);
    if magic != GLB_MAGIC {
        return Err(GltfError::malformed(format!("bad magic {:#010x}", magic)));
    }
    let version = read_u32(bytes, 4);
    if version != GLB_VERSION {
        return Err(GltfError::malformed(format!(
            "unsupported container version {}",
            version
        )));
    }
    let total = read_u32(bytes, 8) as usize;
    if total != bytes.len() {
        return Err(GltfError::malformed(format!(
            "header declares {} bytes but the container has {}",
            total,
            bytes.len()
        )));
    }

    let mut offset = HEADER_LEN;
    let mut json = None;
    let mut chunks = Vec::new();

    while offset < bytes.len() {
        let remaining = bytes.len() - offset;
        if remaining < CHUNK_HEADER_LEN {
            return Err(GltfError::malformed(format!(
                "{} trailing bytes after the last chunk",
                remaining
            )));
        }

        let length = read_u32(bytes, offset) as usize;
        let chunk_type = read_u32(bytes, offset + 4);
        let start = offset + CHUNK_HEADER_LEN;
        let end = match start.checked_add(length) {
            Some(end) if end <= bytes.len() => end,
            _ => {
                return Err(GltfError::malformed(format!(
                    "chunk at offset {} claims {} bytes, past the end of the container",
                    offset, length
                )))
            }
        };
        let data = &bytes[start..end];

        match (json.is_none(), chunk_type) {
            (true, CHUNK_JSON) => json = Some(data),
            (true, other) => {
                return Err(GltfError::malformed(format!(
                    "first chunk has type {:#010x}, expected JSON",
                    other
                )))
            }
            (false, CHUNK_BIN) => chunks.push(data),
            (false, other) => {
                log::debug!("skipping chunk of type {:#010x} ({} bytes)", other, length);
            }
        }

        offset = end;
    }

    let json = json.ok_or_else(|| GltfError::malformed("container has no JSON chunk"))?;
    log::trace!(
        "read GLB: {} byte JSON chunk, {} binary chunk(s)",
        json.len(),
        chunks.len()
    );

    Ok(Container {
        kind: ContainerKind::Binary,
        version: Some(version),
        json,
        chunks,
    })
}

/// Assemble a GLB container from a JSON document and an optional BIN chunk.
///
/// JSON is padded with spaces and BIN with zeros to 4-byte boundaries.
pub fn write_glb(json: &[u8], bin: Option<&[u8]>) -> Vec<u8> {
    let json_padding = padding(json.len());
    let padded_json_len = json.len() + json_padding;

    let bin_len = bin.map(|b| b.len() + padding(b.len()));
    let total_size =
        HEADER_LEN + CHUNK_HEADER_LEN + padded_json_len + bin_len.map_or(0, |l| CHUNK_HEADER_LEN + l);

    let mut output = Vec::with_capacity(total_size);

    output.extend_from_slice(&GLB_MAGIC.to_le_bytes());
    output.extend_from_slice(&GLB_VERSION.to_le_bytes());
    output.extend_from_slice(&(total_size as u32).to_le_bytes());

    output.extend_from_slice(&(padded_json_len as u32).to_le_bytes());
    output.extend_from_slice(&CHUNK_JSON.to_le_bytes());
    output.extend_from_slice(json);
    output.resize(output.len() + json_padding, b' ');

    if let (Some(bin), Some(padded_bin_len)) = (bin, bin_len) {
        output.extend_from_slice(&(padded_bin_len as u32).to_le_bytes());
        output.extend_from_slice(&CHUNK_BIN.to_le_bytes());
        output.extend_from_slice(bin);
        output.resize(output.len() + padding(bin.len()), 0);
    }

    output
}

fn padding(len: usize) -> usize {
    (4 - len % 4) % 4
}

fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

//! Buffers, buffer views and accessors.

use serde::{Deserialize, Serialize};

use crate::extension::Extensions;
use crate::{BufferIndex, BufferViewIndex};

gl_enum! {
    /// Numeric type of a single accessor component.
    pub enum ComponentType : "component type" {
        /// Signed 8-bit integer.
        I8 = 5120,
        /// Unsigned 8-bit integer.
        U8 = 5121,
        /// Signed 16-bit integer.
        I16 = 5122,
        /// Unsigned 16-bit integer.
        U16 = 5123,
        /// Unsigned 32-bit integer.
        U32 = 5125,
        /// IEEE-754 single precision float.
        F32 = 5126,
    }
}

impl ComponentType {
    /// Size of one component in bytes.
    pub const fn size(self) -> usize {
        match self {
            Self::I8 | Self::U8 => 1,
            Self::I16 | Self::U16 => 2,
            Self::U32 | Self::F32 => 4,
        }
    }

    /// Whether the type is a signed integer.
    pub const fn is_signed_integer(self) -> bool {
        matches!(self, Self::I8 | Self::I16)
    }

    /// Whether the type is an unsigned integer.
    pub const fn is_unsigned_integer(self) -> bool {
        matches!(self, Self::U8 | Self::U16 | Self::U32)
    }
}

/// Shape of one accessor element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ElementType {
    Scalar,
    Vec2,
    Vec3,
    Vec4,
    Mat2,
    Mat3,
    Mat4,
}

impl ElementType {
    /// Number of components per element.
    pub const fn components(self) -> usize {
        match self {
            Self::Scalar => 1,
            Self::Vec2 => 2,
            Self::Vec3 => 3,
            Self::Vec4 | Self::Mat2 => 4,
            Self::Mat3 => 9,
            Self::Mat4 => 16,
        }
    }

    /// Number of matrix columns (1 for non-matrix types).
    pub const fn columns(self) -> usize {
        match self {
            Self::Mat2 => 2,
            Self::Mat3 => 3,
            Self::Mat4 => 4,
            _ => 1,
        }
    }

    /// Number of rows per column.
    pub const fn rows(self) -> usize {
        self.components() / self.columns()
    }

    /// Byte size of one element including matrix column padding.
    ///
    /// Matrix columns start on 4-byte boundaries, so a MAT3 of bytes
    /// occupies 12 bytes rather than 9.
    pub const fn byte_size(self, component: ComponentType) -> usize {
        let column = self.rows() * component.size();
        let padded = (column + 3) & !3;
        match self {
            Self::Mat2 | Self::Mat3 | Self::Mat4 => padded * self.columns(),
            _ => column,
        }
    }

    /// Byte offset of the `component`-th component inside one element.
    pub const fn component_offset(self, component_type: ComponentType, component: usize) -> usize {
        let rows = self.rows();
        let column = component / rows;
        let row = component % rows;
        let column_size = match self {
            Self::Mat2 | Self::Mat3 | Self::Mat4 => (rows * component_type.size() + 3) & !3,
            _ => rows * component_type.size(),
        };
        column * column_size + row * component_type.size()
    }
}

/// A typed view into a buffer view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Accessor {
    /// Buffer view index; absent means zero-filled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buffer_view: Option<BufferViewIndex>,
    /// Byte offset within the buffer view.
    #[serde(default)]
    pub byte_offset: usize,
    /// Component type.
    pub component_type: ComponentType,
    /// Whether integer values are normalized to [0, 1] or [-1, 1].
    #[serde(default)]
    pub normalized: bool,
    /// Number of elements.
    pub count: usize,
    /// Element type.
    #[serde(rename = "type")]
    pub element_type: ElementType,
    /// Per-component maximum.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<Vec<f32>>,
    /// Per-component minimum.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<Vec<f32>>,
    /// Sparse overrides.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sparse: Option<Sparse>,
    /// Accessor name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Extensions::is_empty")]
    pub extensions: Extensions,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extras: Option<serde_json::Value>,
}

impl Accessor {
    /// Byte size of one element.
    pub fn element_size(&self) -> usize {
        self.element_type.byte_size(self.component_type)
    }

    /// Bytes needed to hold `count` tightly packed elements, saturating at
    /// `usize::MAX`.
    pub fn packed_size(&self) -> usize {
        self.count.saturating_mul(self.element_size())
    }
}

/// Sparse storage: `count` (index, value) pairs overriding the base array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sparse {
    /// Number of overridden elements.
    pub count: usize,
    /// Where the overridden positions are stored.
    pub indices: SparseIndices,
    /// Where the replacement values are stored.
    pub values: SparseValues,
}

/// Index half of a sparse accessor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SparseIndices {
    pub buffer_view: BufferViewIndex,
    #[serde(default)]
    pub byte_offset: usize,
    /// Unsigned integer type of the stored indices.
    pub component_type: ComponentType,
}

/// Value half of a sparse accessor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SparseValues {
    pub buffer_view: BufferViewIndex,
    #[serde(default)]
    pub byte_offset: usize,
}

/// A byte range inside a buffer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BufferView {
    /// Buffer index.
    pub buffer: BufferIndex,
    /// Byte offset into the buffer.
    #[serde(default)]
    pub byte_offset: usize,
    /// Byte length.
    pub byte_length: usize,
    /// Distance between consecutive elements; absent or zero means packed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub byte_stride: Option<usize>,
    /// GPU binding hint (34962=ARRAY_BUFFER, 34963=ELEMENT_ARRAY_BUFFER).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Extensions::is_empty")]
    pub extensions: Extensions,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extras: Option<serde_json::Value>,
}

impl BufferView {
    /// Stride to use when walking elements of `element_size` bytes.
    pub fn stride_for(&self, element_size: usize) -> usize {
        match self.byte_stride {
            Some(stride) if stride > 0 => stride,
            _ => element_size,
        }
    }

    /// One past the last byte of the view in its buffer.
    pub fn end(&self) -> usize {
        self.byte_offset.saturating_add(self.byte_length)
    }
}

/// A logical byte store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Buffer {
    /// Declared length in bytes.
    pub byte_length: usize,
    /// Data URI or relative path; absent means the GLB binary chunk.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Extensions::is_empty")]
    pub extensions: Extensions,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extras: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_component_type_codes() {
        assert_eq!(ComponentType::try_from(5126), Ok(ComponentType::F32));
        assert_eq!(ComponentType::U16.code(), 5123);
        assert!(ComponentType::try_from(5124).is_err());

        let parsed: ComponentType = serde_json::from_str("5121").unwrap();
        assert_eq!(parsed, ComponentType::U8);
        assert_eq!(serde_json::to_string(&ComponentType::I16).unwrap(), "5122");
    }

    #[test]
    fn test_element_type_names() {
        let parsed: ElementType = serde_json::from_str("\"VEC3\"").unwrap();
        assert_eq!(parsed, ElementType::Vec3);
        assert_eq!(serde_json::to_string(&ElementType::Mat4).unwrap(), "\"MAT4\"");
        assert!(serde_json::from_str::<ElementType>("\"VEC5\"").is_err());
    }

    #[test]
    fn test_matrix_column_padding() {
        assert_eq!(ElementType::Mat2.byte_size(ComponentType::U8), 8);
        assert_eq!(ElementType::Mat3.byte_size(ComponentType::U8), 12);
        assert_eq!(ElementType::Mat3.byte_size(ComponentType::I16), 24);
        assert_eq!(ElementType::Mat4.byte_size(ComponentType::F32), 64);
        assert_eq!(ElementType::Vec3.byte_size(ComponentType::F32), 12);

        // Second column of a byte MAT3 starts at offset 4.
        assert_eq!(ElementType::Mat3.component_offset(ComponentType::U8, 3), 4);
        assert_eq!(ElementType::Vec3.component_offset(ComponentType::F32, 2), 8);
    }

    #[test]
    fn test_accessor_requires_component_type() {
        let json = r#"{"count": 3, "type": "VEC3"}"#;
        let err = serde_json::from_str::<Accessor>(json).unwrap_err();
        assert!(err.to_string().contains("componentType"));
    }

    #[test]
    fn test_stride_fallback() {
        let view = BufferView {
            buffer: BufferIndex::new(0),
            byte_offset: 0,
            byte_length: 64,
            byte_stride: Some(0),
            target: None,
            name: None,
            extensions: Extensions::default(),
            extras: None,
        };
        assert_eq!(view.stride_for(12), 12);
    }
}

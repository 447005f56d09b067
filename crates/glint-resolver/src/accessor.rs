//! Decoding accessors into typed arrays.

use glam::{Mat4, Vec2, Vec3, Vec4};
use glint_core::{
    Accessor, AccessorIndex, ComponentType, Document, ElementType, GltfError, Result,
};

use crate::buffer::{view_bytes, BufferLookup};

/// Largest zero-filled array decoded for an accessor without a buffer view.
const MAX_UNBACKED_BYTES: usize = 1 << 30;

/// Raw component values of a decoded accessor, one vector per component type.
#[derive(Debug, Clone, PartialEq)]
pub enum ComponentData {
    I8(Vec<i8>),
    U8(Vec<u8>),
    I16(Vec<i16>),
    U16(Vec<u16>),
    U32(Vec<u32>),
    F32(Vec<f32>),
}

impl ComponentData {
    fn zeroed(component_type: ComponentType, len: usize) -> Self {
        match component_type {
            ComponentType::I8 => Self::I8(vec![0; len]),
            ComponentType::U8 => Self::U8(vec![0; len]),
            ComponentType::I16 => Self::I16(vec![0; len]),
            ComponentType::U16 => Self::U16(vec![0; len]),
            ComponentType::U32 => Self::U32(vec![0; len]),
            ComponentType::F32 => Self::F32(vec![0.0; len]),
        }
    }

    /// Component type of the stored values.
    pub fn component_type(&self) -> ComponentType {
        match self {
            Self::I8(_) => ComponentType::I8,
            Self::U8(_) => ComponentType::U8,
            Self::I16(_) => ComponentType::I16,
            Self::U16(_) => ComponentType::U16,
            Self::U32(_) => ComponentType::U32,
            Self::F32(_) => ComponentType::F32,
        }
    }

    /// Number of components.
    pub fn len(&self) -> usize {
        match self {
            Self::I8(v) => v.len(),
            Self::U8(v) => v.len(),
            Self::I16(v) => v.len(),
            Self::U16(v) => v.len(),
            Self::U32(v) => v.len(),
            Self::F32(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Store the little-endian value at `bytes[offset..]` as component `slot`.
    /// The caller has checked that the read is in bounds.
    fn store(&mut self, slot: usize, bytes: &[u8], offset: usize) {
        let b = &bytes[offset..];
        match self {
            Self::I8(v) => v[slot] = b[0] as i8,
            Self::U8(v) => v[slot] = b[0],
            Self::I16(v) => v[slot] = i16::from_le_bytes([b[0], b[1]]),
            Self::U16(v) => v[slot] = u16::from_le_bytes([b[0], b[1]]),
            Self::U32(v) => v[slot] = u32::from_le_bytes([b[0], b[1], b[2], b[3]]),
            Self::F32(v) => v[slot] = f32::from_le_bytes([b[0], b[1], b[2], b[3]]),
        }
    }

    /// Component `i` as f32, normalized when `normalized` is set.
    fn get_f32(&self, i: usize, normalized: bool) -> f32 {
        if !normalized {
            return match self {
                Self::I8(v) => v[i] as f32,
                Self::U8(v) => v[i] as f32,
                Self::I16(v) => v[i] as f32,
                Self::U16(v) => v[i] as f32,
                Self::U32(v) => v[i] as f32,
                Self::F32(v) => v[i],
            };
        }
        match self {
            Self::I8(v) => (v[i] as f32 / i8::MAX as f32).max(-1.0),
            Self::U8(v) => v[i] as f32 / u8::MAX as f32,
            Self::I16(v) => (v[i] as f32 / i16::MAX as f32).max(-1.0),
            Self::U16(v) => v[i] as f32 / u16::MAX as f32,
            Self::U32(v) => (v[i] as f64 / u32::MAX as f64) as f32,
            Self::F32(v) => v[i],
        }
    }

    /// Component `i` as a signed 64-bit integer; `None` for floats.
    fn get_i64(&self, i: usize) -> Option<i64> {
        match self {
            Self::I8(v) => Some(v[i] as i64),
            Self::U8(v) => Some(v[i] as i64),
            Self::I16(v) => Some(v[i] as i64),
            Self::U16(v) => Some(v[i] as i64),
            Self::U32(v) => Some(v[i] as i64),
            Self::F32(_) => None,
        }
    }
}

/// A decoded accessor: `count` elements of `element_type`, components stored
/// flat in element order.
#[derive(Debug, Clone, PartialEq)]
pub struct TypedArray {
    pub element_type: ElementType,
    pub normalized: bool,
    pub data: ComponentData,
}

impl TypedArray {
    /// Number of elements.
    pub fn len(&self) -> usize {
        self.data.len() / self.element_type.components()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn component_type(&self) -> ComponentType {
        self.data.component_type()
    }

    /// All components as f32, applying normalization.
    ///
    /// Normalized unsigned values map to `[0, 1]`; signed values map to
    /// `[-1, 1]` with the most negative integer clamped.
    pub fn to_f32(&self) -> Vec<f32> {
        (0..self.data.len())
            .map(|i| self.data.get_f32(i, self.normalized))
            .collect()
    }

    /// Integer components widened to u32; `None` for float data or negative values.
    pub fn to_u32(&self) -> Option<Vec<u32>> {
        (0..self.data.len())
            .map(|i| self.data.get_i64(i).and_then(|v| u32::try_from(v).ok()))
            .collect()
    }

    pub fn to_vec2(&self) -> Option<Vec<Vec2>> {
        self.chunks(ElementType::Vec2, |c| Vec2::new(c[0], c[1]))
    }

    pub fn to_vec3(&self) -> Option<Vec<Vec3>> {
        self.chunks(ElementType::Vec3, |c| Vec3::new(c[0], c[1], c[2]))
    }

    pub fn to_vec4(&self) -> Option<Vec<Vec4>> {
        self.chunks(ElementType::Vec4, |c| Vec4::new(c[0], c[1], c[2], c[3]))
    }

    /// Column-major 4x4 matrices.
    pub fn to_mat4(&self) -> Option<Vec<Mat4>> {
        self.chunks(ElementType::Mat4, Mat4::from_cols_slice)
    }

    /// VEC4 unsigned joint indices.
    pub fn to_u16x4(&self) -> Option<Vec<[u16; 4]>> {
        if self.element_type != ElementType::Vec4 {
            return None;
        }
        match &self.data {
            ComponentData::U8(v) => Some(
                v.chunks_exact(4)
                    .map(|c| [c[0] as u16, c[1] as u16, c[2] as u16, c[3] as u16])
                    .collect(),
            ),
            ComponentData::U16(v) => Some(
                v.chunks_exact(4)
                    .map(|c| [c[0], c[1], c[2], c[3]])
                    .collect(),
            ),
            _ => None,
        }
    }

    fn chunks<T>(&self, expected: ElementType, build: impl Fn(&[f32]) -> T) -> Option<Vec<T>> {
        if self.element_type != expected {
            return None;
        }
        let values = self.to_f32();
        Some(
            values
                .chunks_exact(expected.components())
                .map(build)
                .collect(),
        )
    }
}

/// Decode accessor `index` into a [`TypedArray`].
///
/// An accessor without a buffer view decodes to zeros before sparse
/// overrides are applied. Reading outside the buffer view or buffer is an
/// [`GltfError::AccessorBoundsError`].
pub fn decode_accessor<B>(document: &Document, index: AccessorIndex, buffers: &B) -> Result<TypedArray>
where
    B: BufferLookup + ?Sized,
{
    let accessor = document.require(index, "decode request")?;
    let id = index.value();
    let len = output_len(accessor, id)?;

    let mut data = match accessor.buffer_view {
        Some(view_index) => {
            let view = document.require(view_index, "accessor")?;
            let element_size = accessor.element_size();
            if let Some(stride) = view.byte_stride {
                if stride != 0 && stride < element_size {
                    return Err(GltfError::schema(format!(
                        "accessors[{}]: byteStride {} is smaller than the {}-byte element",
                        id, stride, element_size
                    )));
                }
            }
            let stride = view.stride_for(element_size);
            let bytes = view_bytes(document, view, buffers, |reason| {
                GltfError::accessor_bounds(id, reason)
            })?;
            check_span(accessor, id, bytes.len(), accessor.byte_offset, stride, accessor.count)?;

            let mut data = ComponentData::zeroed(accessor.component_type, len);
            read_elements(accessor, id, bytes, accessor.byte_offset, stride, accessor.count, |i| i, &mut data)?;
            data
        }
        None => {
            let size = len.checked_mul(accessor.component_type.size());
            if !matches!(size, Some(n) if n <= MAX_UNBACKED_BYTES) {
                return Err(GltfError::accessor_bounds(
                    id,
                    format!(
                        "{} elements without a buffer view exceed the {}-byte limit",
                        accessor.count, MAX_UNBACKED_BYTES
                    ),
                ));
            }
            ComponentData::zeroed(accessor.component_type, len)
        }
    };

    if let Some(sparse) = &accessor.sparse {
        apply_sparse(document, accessor, id, buffers, &mut data)?;
        log::trace!("accessor {}: applied {} sparse overrides", id, sparse.count);
    }

    Ok(TypedArray {
        element_type: accessor.element_type,
        normalized: accessor.normalized,
        data,
    })
}

/// Read `count` elements starting at `offset`, writing element `i` to slot
/// `target(i)` of `data`.
#[allow(clippy::too_many_arguments)]
fn read_elements(
    accessor: &Accessor,
    id: usize,
    bytes: &[u8],
    offset: usize,
    stride: usize,
    count: usize,
    target: impl Fn(usize) -> usize,
    data: &mut ComponentData,
) -> Result<()> {
    check_span(accessor, id, bytes.len(), offset, stride, count)?;

    let element_type = accessor.element_type;
    let component_type = accessor.component_type;
    let components = element_type.components();
    for i in 0..count {
        let base = offset + i * stride;
        let slot = target(i) * components;
        for c in 0..components {
            let at = base + element_type.component_offset(component_type, c);
            data.store(slot + c, bytes, at);
        }
    }
    Ok(())
}

/// Component count of the decoded array, or an error if it overflows.
fn output_len(accessor: &Accessor, id: usize) -> Result<usize> {
    accessor
        .count
        .checked_mul(accessor.element_type.components())
        .ok_or_else(|| {
            GltfError::accessor_bounds(id, format!("count {} overflows", accessor.count))
        })
}

/// Fail unless `count` elements at `offset` with `stride` fit in `available` bytes.
fn check_span(
    accessor: &Accessor,
    id: usize,
    available: usize,
    offset: usize,
    stride: usize,
    count: usize,
) -> Result<()> {
    if count == 0 {
        return Ok(());
    }
    let element_size = accessor.element_size();
    let needed = (count - 1)
        .checked_mul(stride)
        .and_then(|n| n.checked_add(offset))
        .and_then(|n| n.checked_add(element_size));
    match needed {
        Some(end) if end <= available => Ok(()),
        _ => Err(GltfError::accessor_bounds(
            id,
            format!(
                "{} elements of {} bytes from offset {} with stride {} exceed the {}-byte view",
                count, element_size, offset, stride, available
            ),
        )),
    }
}

fn apply_sparse<B>(
    document: &Document,
    accessor: &Accessor,
    id: usize,
    buffers: &B,
    data: &mut ComponentData,
) -> Result<()>
where
    B: BufferLookup + ?Sized,
{
    let Some(sparse) = &accessor.sparse else {
        return Ok(());
    };
    if sparse.count == 0 {
        return Ok(());
    }

    let index_view = document.require(sparse.indices.buffer_view, "sparse indices")?;
    let index_bytes = view_bytes(document, index_view, buffers, |reason| {
        GltfError::accessor_bounds(id, reason)
    })?;
    let index_type = sparse.indices.component_type;
    let index_size = index_type.size();
    let index_end = sparse
        .count
        .checked_mul(index_size)
        .and_then(|n| n.checked_add(sparse.indices.byte_offset));
    if !matches!(index_end, Some(end) if end <= index_bytes.len()) {
        return Err(GltfError::accessor_bounds(
            id,
            format!(
                "{} sparse indices from offset {} exceed the {}-byte view",
                sparse.count,
                sparse.indices.byte_offset,
                index_bytes.len()
            ),
        ));
    }

    let mut targets = Vec::with_capacity(sparse.count);
    for k in 0..sparse.count {
        let at = sparse.indices.byte_offset + k * index_size;
        let b = &index_bytes[at..];
        let target = match index_type {
            ComponentType::U8 => b[0] as usize,
            ComponentType::U16 => u16::from_le_bytes([b[0], b[1]]) as usize,
            ComponentType::U32 => u32::from_le_bytes([b[0], b[1], b[2], b[3]]) as usize,
            other => {
                return Err(GltfError::schema(format!(
                    "accessors[{}]: sparse indices cannot use {:?}",
                    id, other
                )))
            }
        };
        if target >= accessor.count {
            return Err(GltfError::accessor_bounds(
                id,
                format!(
                    "sparse index {} at position {} is outside the {} elements",
                    target, k, accessor.count
                ),
            ));
        }
        targets.push(target);
    }

    let value_view = document.require(sparse.values.buffer_view, "sparse values")?;
    let value_bytes = view_bytes(document, value_view, buffers, |reason| {
        GltfError::accessor_bounds(id, reason)
    })?;
    read_elements(
        accessor,
        id,
        value_bytes,
        sparse.values.byte_offset,
        accessor.element_size(),
        sparse.count,
        |k| targets[k],
        data,
    )
}

/// Decode an index accessor into `u32` vertex indices.
///
/// Index data must be SCALAR integers. Signed types are accepted as long as
/// no value is negative; floats never are.
pub fn decode_indices<B>(document: &Document, index: AccessorIndex, buffers: &B) -> Result<Vec<u32>>
where
    B: BufferLookup + ?Sized,
{
    let accessor = document.require(index, "decode request")?;
    if accessor.component_type == ComponentType::F32 {
        return Err(GltfError::corrupt_indices(index.value(), "index data cannot be FLOAT"));
    }
    let array = decode_accessor(document, index, buffers)?;
    indices_from(&array, index.value())
}

/// Widen decoded SCALAR integer data to `u32` indices.
pub(crate) fn indices_from(array: &TypedArray, id: usize) -> Result<Vec<u32>> {
    if array.element_type != ElementType::Scalar {
        return Err(GltfError::corrupt_indices(
            id,
            format!("index data must be SCALAR, not {:?}", array.element_type),
        ));
    }
    let data = &array.data;
    let mut indices = Vec::with_capacity(data.len());
    for i in 0..data.len() {
        match data.get_i64(i) {
            Some(v) if v >= 0 => indices.push(v as u32),
            Some(v) => {
                return Err(GltfError::corrupt_indices(
                    id,
                    format!("negative index {} at position {}", v, i),
                ))
            }
            None => return Err(GltfError::corrupt_indices(id, "index data cannot be FLOAT")),
        }
    }
    Ok(indices)
}

//! Typed indices into the document's arenas.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Position of an element in one of the [`Document`](crate::Document) arrays.
///
/// Serializes as a bare JSON integer. The type parameter only records which
/// array the index belongs to, so a node index cannot be passed where a mesh
/// index is expected.
pub struct Index<T> {
    value: u32,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Index<T> {
    /// Wrap a raw array position.
    pub const fn new(value: u32) -> Self {
        Self {
            value,
            _marker: PhantomData,
        }
    }

    /// Wrap a `usize` position, or `None` past `u32::MAX`.
    pub fn from_position(position: usize) -> Option<Self> {
        u32::try_from(position).ok().map(Self::new)
    }

    /// The raw array position.
    pub const fn value(self) -> usize {
        self.value as usize
    }

    /// Look the element up in `items`.
    pub fn get(self, items: &[T]) -> Option<&T> {
        items.get(self.value())
    }
}

impl<T> Clone for Index<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Index<T> {}

impl<T> PartialEq for Index<T> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<T> Eq for Index<T> {}

impl<T> PartialOrd for Index<T> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Index<T> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.value.cmp(&other.value)
    }
}

impl<T> Hash for Index<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl<T> fmt::Debug for Index<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.value)
    }
}

impl<T> fmt::Display for Index<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl<T> From<u32> for Index<T> {
    fn from(value: u32) -> Self {
        Self::new(value)
    }
}

impl<T> Serialize for Index<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(self.value)
    }
}

impl<'de, T> Deserialize<'de> for Index<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        u32::deserialize(deserializer).map(Self::new)
    }
}

//! Write-once memo tables keyed by entity index.

use std::sync::OnceLock;

use glint_core::{GltfError, Result};

/// One write-once cell per index of a document array.
///
/// The first caller for an index runs the resolver; concurrent callers for
/// the same index wait for it. The outcome, success or failure, is kept for
/// the lifetime of the cache.
pub struct IndexCache<T> {
    what: &'static str,
    cells: Vec<OnceLock<Result<T>>>,
}

impl<T> IndexCache<T> {
    /// A cache with `len` empty cells. `what` names the array in errors.
    pub fn new(what: &'static str, len: usize) -> Self {
        Self {
            what,
            cells: (0..len).map(|_| OnceLock::new()).collect(),
        }
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// The memoized value for `index`, running `resolve` on first use.
    pub fn get_or_resolve(&self, index: usize, resolve: impl FnOnce() -> Result<T>) -> Result<&T> {
        let cell = self
            .cells
            .get(index)
            .ok_or_else(|| GltfError::out_of_range("lookup", self.what, index, self.cells.len()))?;
        match cell.get_or_init(resolve) {
            Ok(value) => Ok(value),
            Err(err) => Err(err.clone()),
        }
    }

    /// The stored outcome for `index`, if it was resolved.
    pub fn peek(&self, index: usize) -> Option<&Result<T>> {
        self.cells.get(index)?.get()
    }

    /// Number of cells holding an outcome.
    pub fn resolved(&self) -> usize {
        self.cells.iter().filter(|cell| cell.get().is_some()).count()
    }
}

impl<T> std::fmt::Debug for IndexCache<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexCache")
            .field("what", &self.what)
            .field("len", &self.cells.len())
            .field("resolved", &self.resolved())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_resolves_once() {
        let cache: IndexCache<u32> = IndexCache::new("buffer", 2);
        let calls = Cell::new(0);
        for _ in 0..3 {
            let value = cache
                .get_or_resolve(1, || {
                    calls.set(calls.get() + 1);
                    Ok(42)
                })
                .unwrap();
            assert_eq!(*value, 42);
        }
        assert_eq!(calls.get(), 1);
        assert_eq!(cache.resolved(), 1);
        assert!(cache.peek(0).is_none());
    }

    #[test]
    fn test_failure_is_memoized() {
        let cache: IndexCache<u32> = IndexCache::new("buffer", 1);
        let first = cache.get_or_resolve(0, || Err(GltfError::NoScene)).unwrap_err();
        let second = cache.get_or_resolve(0, || Ok(1)).unwrap_err();
        assert_eq!(first, second);
    }

    #[test]
    fn test_index_out_of_range() {
        let cache: IndexCache<u32> = IndexCache::new("image", 1);
        assert!(matches!(
            cache.get_or_resolve(3, || Ok(1)),
            Err(GltfError::ReferenceOutOfRange { target: "image", index: 3, len: 1, .. })
        ));
    }
}

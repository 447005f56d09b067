//! Byte sources: where external buffers and images come from.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use thiserror::Error;

/// Failure reported by a [`ByteSource`].
#[derive(Debug, Error)]
pub enum SourceError {
    /// Nothing exists at the path.
    #[error("not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The path exists but could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The source does not serve external reads.
    #[error("external reads are disabled ({})", .0.display())]
    Refused(PathBuf),
}

/// Supplies the bytes of files referenced by relative URIs.
///
/// Paths arrive already joined with the document's base directory.
pub trait ByteSource: Send + Sync {
    /// Read the entire file at `path`.
    fn read(&self, path: &Path) -> Result<Vec<u8>, SourceError>;
}

/// Reads from the local file system.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileSystemSource;

impl ByteSource for FileSystemSource {
    fn read(&self, path: &Path) -> Result<Vec<u8>, SourceError> {
        log::debug!("reading {}", path.display());
        std::fs::read(path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                SourceError::NotFound(path.to_path_buf())
            } else {
                SourceError::Io {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })
    }
}

/// In-memory source for tests and embedded assets.
///
/// Cloning shares the underlying files.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    files: Arc<RwLock<HashMap<PathBuf, Vec<u8>>>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a file, replacing any existing one at the same path.
    pub fn insert(&self, path: impl Into<PathBuf>, data: Vec<u8>) {
        let mut files = self.files.write().unwrap_or_else(|e| e.into_inner());
        files.insert(path.into(), data);
    }

    /// Builder form of [`MemorySource::insert`].
    pub fn with_file(self, path: impl Into<PathBuf>, data: Vec<u8>) -> Self {
        self.insert(path, data);
        self
    }

    pub fn remove(&self, path: &Path) -> Option<Vec<u8>> {
        let mut files = self.files.write().unwrap_or_else(|e| e.into_inner());
        files.remove(path)
    }
}

impl ByteSource for MemorySource {
    fn read(&self, path: &Path) -> Result<Vec<u8>, SourceError> {
        let files = self.files.read().unwrap_or_else(|e| e.into_inner());
        files
            .get(path)
            .cloned()
            .ok_or_else(|| SourceError::NotFound(path.to_path_buf()))
    }
}

/// Refuses every read. The default for in-memory imports.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSource;

impl ByteSource for NoSource {
    fn read(&self, path: &Path) -> Result<Vec<u8>, SourceError> {
        Err(SourceError::Refused(path.to_path_buf()))
    }
}

impl<S: ByteSource + ?Sized> ByteSource for Arc<S> {
    fn read(&self, path: &Path) -> Result<Vec<u8>, SourceError> {
        (**self).read(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_memory_source() {
        let source = MemorySource::new().with_file("models/a.bin", vec![1, 2, 3]);
        assert_eq!(source.read(Path::new("models/a.bin")).unwrap(), vec![1, 2, 3]);
        assert!(matches!(
            source.read(Path::new("models/b.bin")),
            Err(SourceError::NotFound(_))
        ));

        let shared = source.clone();
        shared.remove(Path::new("models/a.bin"));
        assert!(source.read(Path::new("models/a.bin")).is_err());
    }

    #[test]
    fn test_no_source_refuses() {
        let err = NoSource.read(Path::new("a.bin")).unwrap_err();
        assert!(err.to_string().contains("disabled"));
    }

    #[test]
    fn test_file_system_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.bin");
        std::fs::File::create(&path)
            .unwrap()
            .write_all(&[9, 8, 7])
            .unwrap();

        assert_eq!(FileSystemSource.read(&path).unwrap(), vec![9, 8, 7]);
        assert!(matches!(
            FileSystemSource.read(&dir.path().join("missing.bin")),
            Err(SourceError::NotFound(_))
        ));
    }
}

//! Import configuration.

use std::path::PathBuf;

use glint_core::SceneIndex;
use serde::{Deserialize, Serialize};

/// Options for [`Importer::import`](crate::Importer::import).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadOptions {
    /// Directory relative URIs resolve against. `import_file` defaults it to
    /// the asset's directory.
    pub base_dir: Option<PathBuf>,
    /// Scene to build; the document's default scene when unset.
    pub scene: Option<SceneIndex>,
    /// Preload on the rayon pool. Needs the `parallel` feature.
    pub parallel: bool,
    /// Resolve every buffer, accessor and image during import instead of on
    /// first use.
    pub preload: bool,
}

impl ReadOptions {
    /// Create default read options.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(base_dir.into());
        self
    }

    pub fn with_scene(mut self, scene: SceneIndex) -> Self {
        self.scene = Some(scene);
        self
    }

    /// Resolve all contents up front.
    pub fn preloaded(mut self) -> Self {
        self.preload = true;
        self
    }

    /// Preload in parallel.
    pub fn parallel(mut self) -> Self {
        self.parallel = true;
        self.preload = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builders() {
        let options = ReadOptions::new()
            .with_base_dir("assets")
            .with_scene(SceneIndex::new(2))
            .parallel();
        assert_eq!(options.base_dir, Some(PathBuf::from("assets")));
        assert_eq!(options.scene, Some(SceneIndex::new(2)));
        assert!(options.preload && options.parallel);
    }

    #[test]
    fn test_deserialize_partial() {
        let options: ReadOptions = serde_json::from_str(r#"{"scene": 1, "preload": true}"#).unwrap();
        assert_eq!(options.scene.map(|s| s.value()), Some(1));
        assert!(options.preload);
        assert!(!options.parallel);
    }
}

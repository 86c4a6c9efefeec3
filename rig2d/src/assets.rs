use crate::Error;
use std::path::PathBuf;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AssetKind {
    Atlas,
    Skeleton,
    Texture,
}

/// Asset-loading collaborator. Returning an owned buffer stands in for the
/// host's explicit reference release: dropping the `Vec` is the release.
pub trait AssetSource {
    fn load(&mut self, kind: AssetKind, path: &str) -> Result<Vec<u8>, Error>;
}

/// Filesystem-backed asset source resolving paths relative to a root.
pub struct FileAssets {
    root: PathBuf,
}

impl FileAssets {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl AssetSource for FileAssets {
    fn load(&mut self, _kind: AssetKind, path: &str) -> Result<Vec<u8>, Error> {
        let full = self.root.join(path);
        std::fs::read(&full).map_err(|e| Error::AssetLoad {
            path: path.to_string(),
            message: e.to_string(),
        })
    }
}

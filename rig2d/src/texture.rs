use crate::{AssetKind, AssetSource, TextureHandle};
use std::collections::HashMap;

/// Decode-and-upload step of the texture bridge.
///
/// Kept behind a trait so the cache can be exercised with a counting fake;
/// the wgpu implementation lives in `rig2d-wgpu`. Returns `None` when the
/// image bytes cannot be decoded (a per-frame soft failure).
pub trait TextureUploader {
    fn upload(&mut self, path: &str, bytes: &[u8]) -> Option<TextureHandle>;
}

/// Path-keyed texture cache shared by every skeleton instance in a process.
///
/// Explicitly passed, never a hidden singleton. Not thread-safe: the whole
/// pipeline runs on the owning GUI thread. Entries are never evicted here.
#[derive(Default)]
pub struct TextureCache {
    entries: HashMap<String, TextureHandle>,
}

impl TextureCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves `path` to a GPU handle, loading, decoding and uploading on
    /// the first request. Repeated requests for the same path return the
    /// cached handle without touching the uploader.
    ///
    /// Failures return [`TextureHandle::NULL`] and are not cached, so a
    /// transiently missing asset is retried on the next request.
    pub fn load(
        &mut self,
        path: &str,
        assets: &mut dyn AssetSource,
        uploader: &mut dyn TextureUploader,
    ) -> TextureHandle {
        if let Some(&handle) = self.entries.get(path) {
            return handle;
        }

        let bytes = match assets.load(AssetKind::Texture, path) {
            Ok(bytes) => bytes,
            Err(e) => {
                log::warn!("failed to load texture '{path}': {e}");
                return TextureHandle::NULL;
            }
        };

        match uploader.upload(path, &bytes) {
            Some(handle) => {
                self.entries.insert(path.to_string(), handle);
                handle
            }
            None => {
                log::warn!("failed to decode texture '{path}'");
                TextureHandle::NULL
            }
        }
    }

    pub fn get(&self, path: &str) -> Option<TextureHandle> {
        self.entries.get(path).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

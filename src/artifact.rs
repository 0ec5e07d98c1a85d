//! In-memory artifact store handing out releasable `blob:` style handles.
//!
//! Every binary result of a ritual (the submitted image and the severed one)
//! lives here until its [`ArtifactHandle`] is released.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use uuid::Uuid;

/// Opaque, explicitly releasable reference to bytes held by an [`ArtifactStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArtifactHandle(Uuid);

impl fmt::Display for ArtifactHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "blob:phantom-crop/{}", self.0)
    }
}

/// Owns artifact bytes keyed by handle.
#[derive(Debug, Default)]
pub struct ArtifactStore {
    blobs: HashMap<ArtifactHandle, Vec<u8>>,
    created: u64,
    released: u64,
}

impl ArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register bytes and return a handle valid until released.
    pub fn create(&mut self, bytes: Vec<u8>) -> ArtifactHandle {
        let handle = ArtifactHandle(Uuid::new_v4());
        tracing::trace!(%handle, len = bytes.len(), "artifact created");
        self.blobs.insert(handle, bytes);
        self.created += 1;
        handle
    }

    /// Free the bytes behind `handle`.
    ///
    /// Returns `false` (and does nothing) if the handle was already released
    /// or never belonged to this store.
    pub fn release(&mut self, handle: &ArtifactHandle) -> bool {
        match self.blobs.remove(handle) {
            Some(_) => {
                self.released += 1;
                tracing::trace!(%handle, "artifact released");
                true
            }
            None => false,
        }
    }

    /// Dereference a live handle.
    pub fn resolve(&self, handle: &ArtifactHandle) -> Option<&[u8]> {
        self.blobs.get(handle).map(Vec::as_slice)
    }

    /// Number of handles currently live.
    pub fn outstanding(&self) -> usize {
        self.blobs.len()
    }

    /// Total handles ever created.
    pub fn created(&self) -> u64 {
        self.created
    }

    /// Total successful releases.
    pub fn released(&self) -> u64 {
        self.released
    }

    /// Write the bytes behind `handle` to `path`.
    pub fn export(&self, handle: &ArtifactHandle, path: &Path) -> Result<()> {
        let bytes = self
            .resolve(handle)
            .with_context(|| format!("artifact {handle} is no longer live"))?;
        std::fs::write(path, bytes)
            .with_context(|| format!("failed to write {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_and_resolve() {
        let mut store = ArtifactStore::new();
        let handle = store.create(b"spirit".to_vec());
        assert_eq!(store.resolve(&handle), Some(&b"spirit"[..]));
        assert_eq!(store.outstanding(), 1);
        assert_eq!(store.created(), 1);
    }

    #[test]
    fn release_is_idempotent() {
        let mut store = ArtifactStore::new();
        let handle = store.create(vec![1, 2, 3]);

        assert!(store.release(&handle));
        assert!(!store.release(&handle));
        assert_eq!(store.resolve(&handle), None);
        assert_eq!(store.outstanding(), 0);
        assert_eq!(store.released(), 1);
    }

    #[test]
    fn foreign_handle_release_is_noop() {
        let mut store = ArtifactStore::new();
        let mut other = ArtifactStore::new();
        let foreign = other.create(vec![9]);
        store.create(vec![1]);

        assert!(!store.release(&foreign));
        assert_eq!(store.outstanding(), 1);
    }

    #[test]
    fn handles_are_distinct_even_for_equal_bytes() {
        let mut store = ArtifactStore::new();
        let a = store.create(vec![7; 4]);
        let b = store.create(vec![7; 4]);
        assert_ne!(a, b);
        assert_eq!(store.outstanding(), 2);
    }

    #[test]
    fn handle_renders_as_blob_url() {
        let mut store = ArtifactStore::new();
        let handle = store.create(Vec::new());
        assert!(handle.to_string().starts_with("blob:phantom-crop/"));
    }

    #[test]
    fn export_writes_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("phantom_severed.png");
        let mut store = ArtifactStore::new();
        let handle = store.create(b"png-ish".to_vec());

        store.export(&handle, &path).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"png-ish");
    }

    #[test]
    fn export_of_released_handle_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = ArtifactStore::new();
        let handle = store.create(vec![1]);
        store.release(&handle);

        let err = store.export(&handle, &dir.path().join("x.png")).unwrap_err();
        assert!(err.to_string().contains("no longer live"));
    }
}

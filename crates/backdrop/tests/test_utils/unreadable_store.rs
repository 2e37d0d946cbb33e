//! Store whose payloads can be made unreadable while still listed.

use backdrop::{CacheKey, CacheRecord, Manifest};
use backdrop_error::BackdropResult;
use backdrop_store::{BlobStore, ManifestStore, MemoryBlobStore};
use std::collections::{BTreeSet, HashSet};
use std::sync::Mutex;

/// Wraps [`MemoryBlobStore`]; `get` on a hidden key returns `None`, the way a
/// corrupt payload reads on disk.
#[derive(Default)]
pub struct UnreadableStore {
    pub inner: MemoryBlobStore,
    hidden: Mutex<HashSet<CacheKey>>,
}

impl UnreadableStore {
    pub fn hide(&self, key: CacheKey) {
        self.hidden.lock().unwrap().insert(key);
    }
}

#[async_trait::async_trait]
impl BlobStore for UnreadableStore {
    async fn get(&self, key: &CacheKey) -> Option<CacheRecord> {
        if self.hidden.lock().unwrap().contains(key) {
            return None;
        }
        self.inner.get(key).await
    }

    async fn put(&self, record: &CacheRecord) -> BackdropResult<()> {
        self.inner.put(record).await
    }

    async fn delete(&self, key: &CacheKey) -> BackdropResult<()> {
        self.inner.delete(key).await
    }

    async fn list_keys(&self) -> BTreeSet<CacheKey> {
        self.inner.list_keys().await
    }

    async fn list_full_tier_keys(&self) -> BTreeSet<CacheKey> {
        self.inner.list_full_tier_keys().await
    }
}

#[async_trait::async_trait]
impl ManifestStore for UnreadableStore {
    async fn load_manifest(&self) -> Option<Manifest> {
        self.inner.load_manifest().await
    }

    async fn save_manifest(&self, manifest: &Manifest) -> BackdropResult<()> {
        self.inner.save_manifest(manifest).await
    }
}

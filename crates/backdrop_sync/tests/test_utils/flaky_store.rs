//! Store wrapper whose blob writes can fail independently of the manifest.

use backdrop_core::Manifest;
use backdrop_error::{BackdropResult, StorageError, StorageErrorKind};
use backdrop_store::{BlobStore, CacheKey, CacheRecord, ManifestStore, MemoryBlobStore};
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Default)]
pub struct FlakyStore {
    pub inner: MemoryBlobStore,
    fail_puts: AtomicBool,
}

impl FlakyStore {
    pub fn set_fail_puts(&self, fail: bool) {
        self.fail_puts.store(fail, Ordering::SeqCst);
    }
}

#[async_trait::async_trait]
impl BlobStore for FlakyStore {
    async fn get(&self, key: &CacheKey) -> Option<CacheRecord> {
        self.inner.get(key).await
    }

    async fn put(&self, record: &CacheRecord) -> BackdropResult<()> {
        if self.fail_puts.load(Ordering::SeqCst) {
            return Err(StorageError::new(StorageErrorKind::FileWrite("disk full".to_string())).into());
        }
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
impl ManifestStore for FlakyStore {
    async fn load_manifest(&self) -> Option<Manifest> {
        self.inner.load_manifest().await
    }

    async fn save_manifest(&self, manifest: &Manifest) -> BackdropResult<()> {
        self.inner.save_manifest(manifest).await
    }
}

//! In-memory store for tests and ephemeral hosts.

use crate::{BlobStore, CacheKey, CacheRecord, Kind, ManifestStore};
use backdrop_core::Manifest;
use backdrop_error::{BackdropResult, StorageError, StorageErrorKind};
use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::RwLock;

/// Volatile implementation of [`BlobStore`] and [`ManifestStore`].
///
/// Keeps the two tiers in separate maps so routing behaves like the
/// filesystem store. Writes can be made to fail on demand to exercise
/// storage-failure paths.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    preview: RwLock<HashMap<CacheKey, CacheRecord>>,
    full: RwLock<HashMap<CacheKey, CacheRecord>>,
    manifest: RwLock<Option<Manifest>>,
    fail_writes: AtomicBool,
    puts: AtomicUsize,
}

impl MemoryBlobStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `put`, `delete` and `save_manifest` fail.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of successful `put` calls so far.
    pub fn put_count(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    /// Number of records in one tier.
    pub async fn tier_len(&self, kind: Kind) -> usize {
        self.tier(kind).read().await.len()
    }

    fn tier(&self, kind: Kind) -> &RwLock<HashMap<CacheKey, CacheRecord>> {
        match kind {
            Kind::Preview => &self.preview,
            Kind::Full => &self.full,
        }
    }

    fn check_writable(&self) -> Result<(), StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            Err(StorageError::new(StorageErrorKind::Unavailable(
                "memory store rejecting writes".to_string(),
            )))
        } else {
            Ok(())
        }
    }
}

#[async_trait::async_trait]
impl BlobStore for MemoryBlobStore {
    async fn get(&self, key: &CacheKey) -> Option<CacheRecord> {
        self.tier(key.kind()).read().await.get(key).cloned()
    }

    async fn put(&self, record: &CacheRecord) -> BackdropResult<()> {
        self.check_writable()?;
        if record.asset_id().trim().is_empty() {
            return Err(StorageError::new(StorageErrorKind::InvalidKey(record.key.to_string())).into());
        }
        self.tier(record.kind())
            .write()
            .await
            .insert(record.key.clone(), record.clone());
        self.puts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn delete(&self, key: &CacheKey) -> BackdropResult<()> {
        self.check_writable()?;
        self.tier(key.kind()).write().await.remove(key);
        Ok(())
    }

    async fn list_keys(&self) -> BTreeSet<CacheKey> {
        let mut keys: BTreeSet<CacheKey> = self.preview.read().await.keys().cloned().collect();
        keys.extend(self.full.read().await.keys().cloned());
        keys
    }

    async fn list_full_tier_keys(&self) -> BTreeSet<CacheKey> {
        self.full
            .read()
            .await
            .values()
            .filter(|record| record.is_ok())
            .map(|record| record.key.clone())
            .collect()
    }
}

#[async_trait::async_trait]
impl ManifestStore for MemoryBlobStore {
    async fn load_manifest(&self) -> Option<Manifest> {
        self.manifest.read().await.clone()
    }

    async fn save_manifest(&self, manifest: &Manifest) -> BackdropResult<()> {
        self.check_writable()?;
        *self.manifest.write().await = Some(manifest.clone());
        Ok(())
    }
}

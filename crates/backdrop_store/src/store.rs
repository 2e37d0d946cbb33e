//! Storage trait definitions.

use crate::{CacheKey, CacheRecord};
use backdrop_core::Manifest;
use backdrop_error::BackdropResult;
use std::collections::BTreeSet;

/// Two-tier key→record storage.
///
/// Implementations route every record to the tier named by its key's [`crate::Kind`]
/// and must give at least per-key atomicity: a reader sees either the previous
/// record or the new one, never a mix.
#[async_trait::async_trait]
pub trait BlobStore: Send + Sync {
    /// Read one record.
    ///
    /// Storage errors degrade to `None`; a record whose payload fails its
    /// integrity check also reads as `None`.
    async fn get(&self, key: &CacheKey) -> Option<CacheRecord>;

    /// Insert or replace a record by key.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is empty or storage is unavailable.
    async fn put(&self, record: &CacheRecord) -> BackdropResult<()>;

    /// Remove a record. Removing an absent key succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error if storage is unavailable.
    async fn delete(&self, key: &CacheKey) -> BackdropResult<()>;

    /// Every key across both tiers. Unreadable storage yields an empty set.
    async fn list_keys(&self) -> BTreeSet<CacheKey>;

    /// Full-tier keys whose record holds a confirmed payload.
    async fn list_full_tier_keys(&self) -> BTreeSet<CacheKey>;
}

/// Persistence of the most recently fetched manifest.
#[async_trait::async_trait]
pub trait ManifestStore: Send + Sync {
    /// The persisted manifest, if any. Storage errors degrade to `None`.
    async fn load_manifest(&self) -> Option<Manifest>;

    /// Replace the persisted manifest.
    ///
    /// # Errors
    ///
    /// Returns an error if storage is unavailable.
    async fn save_manifest(&self, manifest: &Manifest) -> BackdropResult<()>;
}

/// A store that holds both the manifest and the blob tiers.
pub trait CacheStore: BlobStore + ManifestStore {}

impl<T: BlobStore + ManifestStore> CacheStore for T {}

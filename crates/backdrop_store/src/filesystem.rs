//! Filesystem-backed two-tier blob store.

use crate::fs_util::{
    META_EXT, PAYLOAD_EXT, compute_digest, file_stem, list_stored_records, read_optional,
    read_stored_record, remove_if_exists, write_atomic,
};
use crate::migration::{self, MigrationReport};
use crate::record::StoredRecord;
use crate::{BlobStore, CacheKey, CacheRecord, Kind, ManifestStore, RecordStatus};
use backdrop_core::Manifest;
use backdrop_error::{BackdropResult, StorageError, StorageErrorKind};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

const OPEN_ATTEMPTS: u32 = 3;
const OPEN_BACKOFF_MS: u64 = 150;
const MANIFEST_FILE: &str = "manifest.json";

/// Filesystem storage backend.
///
/// Layout under the root directory:
///
/// ```text
/// {root}/
/// ├── SCHEMA              (schema version)
/// ├── manifest.json       (last fetched manifest)
/// ├── preview/
/// │   ├── {sha256(key)}.json   (record metadata)
/// │   └── {sha256(key)}.bin    (payload)
/// └── full/
///     ├── {sha256(key)}.json
///     └── {sha256(key)}.bin
/// ```
///
/// Payload and metadata are each written to a temp file and renamed into place.
/// Metadata records the payload's SHA-256, checked on every read.
///
/// If the directories cannot be prepared the store opens *degraded*: reads
/// return nothing and writes fail with [`StorageErrorKind::Unavailable`].
#[derive(Debug, Clone)]
pub struct FileSystemBlobStore {
    root: PathBuf,
    available: bool,
}

impl FileSystemBlobStore {
    /// Open (creating if needed) a store rooted at `root`.
    ///
    /// Directory setup is retried a few times with a growing delay. Once the
    /// layout exists, an older schema is migrated; migration failures are
    /// logged and never make the store unavailable.
    #[instrument(skip(root))]
    pub async fn open(root: impl Into<PathBuf>) -> Self {
        let root = root.into();

        let mut available = false;
        for attempt in 1..=OPEN_ATTEMPTS {
            if attempt > 1 {
                tokio::time::sleep(Duration::from_millis(u64::from(attempt) * OPEN_BACKOFF_MS))
                    .await;
            }
            match Self::prepare_layout(&root).await {
                Ok(()) => {
                    available = true;
                    break;
                }
                Err(e) => warn!(attempt, path = %root.display(), error = %e, "Failed to prepare store"),
            }
        }

        // Last resort: a stray file squatting on the root path.
        if !available && tokio::fs::metadata(&root).await.is_ok_and(|m| m.is_file()) {
            warn!(path = %root.display(), "Store root is a file; replacing it");
            if remove_if_exists(&root).await.is_ok() {
                available = Self::prepare_layout(&root).await.is_ok();
            }
        }

        if available {
            migration::upgrade(&root).await;
            info!(path = %root.display(), "Opened blob store");
        } else {
            warn!(path = %root.display(), "Blob store unavailable, continuing without a cache");
        }

        Self { root, available }
    }

    async fn prepare_layout(root: &Path) -> Result<(), StorageError> {
        for kind in [Kind::Preview, Kind::Full] {
            let dir = root.join(kind.tier_dir());
            tokio::fs::create_dir_all(&dir).await.map_err(|e| {
                StorageError::new(StorageErrorKind::DirectoryCreation(format!(
                    "{}: {}",
                    dir.display(),
                    e
                )))
            })?;
        }
        Ok(())
    }

    /// Root directory of the store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Whether the store opened successfully.
    pub fn is_available(&self) -> bool {
        self.available
    }

    /// Recorded schema version.
    pub async fn schema_version(&self) -> u32 {
        migration::read_schema_version(&self.root).await
    }

    /// Run the legacy preview migration now.
    ///
    /// Opening a store already does this when its schema is old; calling it
    /// again on a migrated store moves nothing.
    #[instrument(skip(self), fields(root = %self.root.display()))]
    pub async fn migrate(&self) -> BackdropResult<MigrationReport> {
        self.ensure_available()?;
        Ok(migration::migrate_legacy_previews(&self.root).await?)
    }

    fn ensure_available(&self) -> Result<(), StorageError> {
        if self.available {
            Ok(())
        } else {
            Err(StorageError::new(StorageErrorKind::Unavailable(format!(
                "{} could not be opened",
                self.root.display()
            ))))
        }
    }

    fn tier_dir(&self, kind: Kind) -> PathBuf {
        self.root.join(kind.tier_dir())
    }

    fn meta_path(&self, key: &CacheKey) -> PathBuf {
        self.tier_dir(key.kind())
            .join(file_stem(&key.to_string()))
            .with_extension(META_EXT)
    }

    fn payload_path(&self, key: &CacheKey) -> PathBuf {
        self.tier_dir(key.kind())
            .join(file_stem(&key.to_string()))
            .with_extension(PAYLOAD_EXT)
    }

    async fn read_record(&self, key: &CacheKey) -> BackdropResult<Option<CacheRecord>> {
        self.ensure_available()?;

        let Some(stored) = read_stored_record(&self.meta_path(key)).await? else {
            return Ok(None);
        };
        if stored.key != key.to_string() {
            debug!(expected = %key, found = %stored.key, "Record key mismatch");
            return Ok(None);
        }

        let payload = if stored.status == RecordStatus::Ok {
            let path = self.payload_path(key);
            let bytes = read_optional(&path).await?.ok_or_else(|| {
                StorageError::new(StorageErrorKind::NotFound(path.display().to_string()))
            })?;
            if let Some(expected) = &stored.digest {
                let actual = compute_digest(&bytes);
                if &actual != expected {
                    return Err(StorageError::new(StorageErrorKind::IntegrityMismatch(format!(
                        "{}: expected {}, got {}",
                        key, expected, actual
                    )))
                    .into());
                }
            }
            Some(bytes)
        } else {
            None
        };

        Ok(Some(stored.into_record(key.clone(), payload)))
    }

    async fn tier_records(&self, kind: Kind) -> Vec<StoredRecord> {
        if !self.available {
            return Vec::new();
        }
        match list_stored_records(&self.tier_dir(kind)).await {
            Ok(records) => records.into_iter().map(|(_, record)| record).collect(),
            Err(e) => {
                warn!(tier = %kind, error = %e, "Failed to list tier");
                Vec::new()
            }
        }
    }
}

#[async_trait::async_trait]
impl BlobStore for FileSystemBlobStore {
    #[instrument(skip(self, key), fields(key = %key))]
    async fn get(&self, key: &CacheKey) -> Option<CacheRecord> {
        match self.read_record(key).await {
            Ok(record) => record,
            Err(e) => {
                warn!(error = %e, "Cache record unreadable, treating as absent");
                None
            }
        }
    }

    #[instrument(skip(self, record), fields(key = %record.key, status = %record.status, size = record.size()))]
    async fn put(&self, record: &CacheRecord) -> BackdropResult<()> {
        self.ensure_available()?;
        if record.asset_id().trim().is_empty() {
            return Err(StorageError::new(StorageErrorKind::InvalidKey(record.key.to_string())).into());
        }

        let payload_path = self.payload_path(&record.key);
        let digest = match &record.payload {
            Some(bytes) => {
                write_atomic(&payload_path, bytes).await?;
                Some(compute_digest(bytes))
            }
            None => {
                remove_if_exists(&payload_path).await?;
                None
            }
        };

        let stored = StoredRecord::from_record(record, digest);
        let meta = serde_json::to_vec_pretty(&stored).map_err(|e| {
            StorageError::new(StorageErrorKind::Serialization(format!("{}: {}", record.key, e)))
        })?;
        write_atomic(&self.meta_path(&record.key), &meta).await?;

        debug!("Stored cache record");
        Ok(())
    }

    #[instrument(skip(self, key), fields(key = %key))]
    async fn delete(&self, key: &CacheKey) -> BackdropResult<()> {
        self.ensure_available()?;
        remove_if_exists(&self.meta_path(key)).await?;
        remove_if_exists(&self.payload_path(key)).await?;
        debug!("Deleted cache record");
        Ok(())
    }

    async fn list_keys(&self) -> BTreeSet<CacheKey> {
        let mut keys = BTreeSet::new();
        for kind in [Kind::Preview, Kind::Full] {
            for stored in self.tier_records(kind).await {
                match stored.key.parse::<CacheKey>() {
                    Ok(key) => {
                        keys.insert(key);
                    }
                    Err(_) => debug!(key = %stored.key, "Ignoring record with unrecognized key"),
                }
            }
        }
        keys
    }

    async fn list_full_tier_keys(&self) -> BTreeSet<CacheKey> {
        let mut keys = BTreeSet::new();
        for stored in self.tier_records(Kind::Full).await {
            if stored.status != RecordStatus::Ok || stored.digest.is_none() {
                continue;
            }
            let Ok(key) = stored.key.parse::<CacheKey>() else {
                continue;
            };
            if key.kind() != Kind::Full {
                continue;
            }
            if tokio::fs::try_exists(self.payload_path(&key)).await.unwrap_or(false) {
                keys.insert(key);
            }
        }
        keys
    }
}

#[async_trait::async_trait]
impl ManifestStore for FileSystemBlobStore {
    async fn load_manifest(&self) -> Option<Manifest> {
        if !self.available {
            return None;
        }
        let path = self.root.join(MANIFEST_FILE);
        let bytes = match read_optional(&path).await {
            Ok(bytes) => bytes?,
            Err(e) => {
                warn!(error = %e, "Failed to read persisted manifest");
                return None;
            }
        };
        match serde_json::from_slice::<Manifest>(&bytes) {
            Ok(manifest) => Some(manifest.normalize()),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Persisted manifest is corrupt");
                None
            }
        }
    }

    #[instrument(skip(self, manifest), fields(version = %manifest.version, entries = manifest.len()))]
    async fn save_manifest(&self, manifest: &Manifest) -> BackdropResult<()> {
        self.ensure_available()?;
        let bytes = serde_json::to_vec_pretty(manifest).map_err(|e| {
            StorageError::new(StorageErrorKind::Serialization(format!("manifest: {}", e)))
        })?;
        write_atomic(&self.root.join(MANIFEST_FILE), &bytes).await?;
        debug!("Persisted manifest");
        Ok(())
    }
}

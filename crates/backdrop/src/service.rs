//! The `Backdrop` service: one store, one synchronizer, one user library.

use crate::BackdropConfig;
use backdrop_core::{Manifest, ManifestEntry, MediaType};
use backdrop_error::BackdropResult;
use backdrop_fetch::{ReqwestTransport, Transport};
use backdrop_selection::{CollectionSource, SelectionState, choose_entry};
use backdrop_store::{
    CacheKey, CacheRecord, CacheStore, FileSystemBlobStore, UserAsset, UserAssetSummary,
    UserLibrary,
};
use backdrop_sync::{DownloadOutcome, SyncConfig, SyncHandle, SyncReport, Synchronizer};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

const USER_LIBRARY_DIR: &str = "user";

/// Where a resolved wallpaper payload came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum PayloadSource {
    /// Full-tier cache record
    #[display("full")]
    Full,
    /// Preview-tier cache record, used when no full payload loaded
    #[display("preview")]
    Preview,
    /// User library
    #[display("user")]
    User,
}

/// A wallpaper ready to present.
#[derive(Debug, Clone, PartialEq)]
pub struct Wallpaper {
    /// Entry that was chosen
    pub entry: ManifestEntry,
    /// Payload bytes
    pub payload: Vec<u8>,
    /// Where `payload` came from
    pub source: PayloadSource,
}

/// Wallpaper asset cache service.
///
/// # Example
///
/// ```no_run
/// use backdrop::{Backdrop, BackdropConfig};
/// use backdrop_selection::SelectionState;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = BackdropConfig::load()?;
/// let backdrop = Backdrop::open(&config).await?;
///
/// // Install/update hook: sync in the background
/// let handle = backdrop.sync();
///
/// if let Some(wallpaper) = backdrop.resolve_wallpaper(&SelectionState::default()).await {
///     println!("Showing {} ({} bytes)", wallpaper.entry.id, wallpaper.payload.len());
/// }
///
/// handle.join().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Backdrop<S = FileSystemBlobStore, T = ReqwestTransport> {
    synchronizer: Synchronizer<S, T>,
    library: UserLibrary,
}

impl Backdrop {
    /// Open the filesystem store and user library under the configured root.
    ///
    /// A store that cannot be prepared opens degraded rather than failing.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the URLs are invalid.
    #[instrument(skip(config), fields(manifest_url = %config.manifest_url))]
    pub async fn open(config: &BackdropConfig) -> BackdropResult<Self> {
        let sync_config = config.sync_config()?;
        let root = config.store_root();
        let store = FileSystemBlobStore::open(&root).await;
        let library = UserLibrary::new(root.join(USER_LIBRARY_DIR));
        info!(root = %root.display(), available = store.is_available(), "Opened Backdrop");

        Self::with_parts(store, ReqwestTransport::new(), library, sync_config)
    }
}

impl<S, T> Backdrop<S, T>
where
    S: CacheStore + 'static,
    T: Transport + 'static,
{
    /// Assemble a service from explicit parts.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the asset base URL does not parse.
    pub fn with_parts(
        store: S,
        transport: T,
        library: UserLibrary,
        config: SyncConfig,
    ) -> BackdropResult<Self> {
        let synchronizer = Synchronizer::new(Arc::new(store), Arc::new(transport), config)?;
        Ok(Self {
            synchronizer,
            library,
        })
    }

    /// The underlying store.
    pub fn store(&self) -> &Arc<S> {
        self.synchronizer.store()
    }

    /// The synchronizer driving this service.
    pub fn synchronizer(&self) -> &Synchronizer<S, T> {
        &self.synchronizer
    }

    /// The user asset library.
    pub fn library(&self) -> &UserLibrary {
        &self.library
    }

    /// Start a sync pass in the background.
    ///
    /// Dropping the handle leaves the pass running.
    pub fn sync(&self) -> SyncHandle {
        self.synchronizer.spawn_sync()
    }

    /// Run a sync pass now and return its report.
    ///
    /// # Errors
    ///
    /// Returns the error that aborted the pass.
    pub async fn refresh(&self) -> BackdropResult<SyncReport> {
        self.synchronizer.run_pass().await
    }

    /// Last persisted manifest.
    pub async fn get_manifest(&self) -> Option<Manifest> {
        self.store().load_manifest().await
    }

    /// Stored record for `key`.
    pub async fn get_cache_record(&self, key: &CacheKey) -> Option<CacheRecord> {
        self.store().get(key).await
    }

    /// Every key in both tiers.
    pub async fn list_keys(&self) -> BTreeSet<CacheKey> {
        self.store().list_keys().await
    }

    /// Full-tier keys with a stored payload.
    pub async fn list_full_tier_keys(&self) -> BTreeSet<CacheKey> {
        self.store().list_full_tier_keys().await
    }

    /// Retry every preview that is not stored.
    ///
    /// # Errors
    ///
    /// Returns a storage error if no manifest has been synced yet.
    pub async fn redownload_missing(
        &self,
        concurrency: Option<usize>,
    ) -> BackdropResult<Vec<DownloadOutcome>> {
        self.synchronizer.redownload_missing(concurrency).await
    }

    /// Fetch and store the full payload of `entry`.
    pub async fn download_full_asset(&self, entry: &ManifestEntry) -> DownloadOutcome {
        self.synchronizer.download_full_asset(entry).await
    }

    /// Pick the entry to present from the persisted manifest and cached payloads.
    pub async fn choose_entry(
        &self,
        state: &SelectionState,
        exclude_id: Option<&str>,
    ) -> Option<ManifestEntry> {
        let manifest = self.get_manifest().await.unwrap_or_default();
        let full_keys = self.list_full_tier_keys().await;
        let user = self.user_entries(state).await;
        choose_entry(&manifest, state, exclude_id, &full_keys, &user).cloned()
    }

    /// Choose an entry and load its payload.
    ///
    /// If the full payload of the first choice does not load, chooses once
    /// more excluding it. If neither full payload loads, the preview of the
    /// last choice is used. Returns `None` when nothing can be shown.
    #[instrument(skip(self, state), fields(mode = %state.mode(), media_type = %state.media_type()))]
    pub async fn resolve_wallpaper(&self, state: &SelectionState) -> Option<Wallpaper> {
        let manifest = self.get_manifest().await.unwrap_or_default();
        let full_keys = self.list_full_tier_keys().await;
        let user = self.user_entries(state).await;

        let first = choose_entry(&manifest, state, None, &full_keys, &user)?.clone();
        if let Some(wallpaper) = self.load_full(&first, &user).await {
            return Some(wallpaper);
        }
        warn!(id = %first.id, "Full payload failed to load, choosing again");

        let retry = choose_entry(&manifest, state, Some(first.id.as_str()), &full_keys, &user)
            .cloned()
            .unwrap_or_else(|| first.clone());
        if retry.id != first.id {
            if let Some(wallpaper) = self.load_full(&retry, &user).await {
                return Some(wallpaper);
            }
        }

        if let Some(wallpaper) = self.load_preview(&retry, &user).await {
            debug!(id = %retry.id, "Falling back to preview payload");
            return Some(wallpaper);
        }

        warn!("No wallpaper available");
        None
    }

    /// Save a user wallpaper, returning its id.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the asset cannot be written.
    pub async fn save_user_asset(
        &self,
        payload: &[u8],
        media_type: MediaType,
        name: Option<String>,
        preview: Option<&[u8]>,
        existing_id: Option<&str>,
    ) -> BackdropResult<String> {
        self.library
            .save(payload, media_type, name, preview, existing_id)
            .await
    }

    /// User wallpapers without their payloads.
    pub async fn list_user_assets(&self) -> Vec<UserAssetSummary> {
        self.library.list().await
    }

    /// One user wallpaper with its payloads.
    pub async fn get_user_asset(&self, id: &str) -> Option<UserAsset> {
        self.library.get(id).await
    }

    /// Remove a user wallpaper.
    ///
    /// # Errors
    ///
    /// Returns a storage error if its files cannot be removed.
    pub async fn delete_user_asset(&self, id: &str) -> BackdropResult<()> {
        self.library.delete(id).await
    }

    async fn user_entries(&self, state: &SelectionState) -> Vec<ManifestEntry> {
        match state.collection_source() {
            CollectionSource::User => self.library.entries(*state.media_type()).await,
            CollectionSource::Predefined => Vec::new(),
        }
    }

    async fn load_full(&self, entry: &ManifestEntry, user: &[ManifestEntry]) -> Option<Wallpaper> {
        if is_user_entry(entry, user) {
            let asset = self.library.get(&entry.id).await?;
            return Some(Wallpaper {
                entry: entry.clone(),
                payload: asset.payload,
                source: PayloadSource::User,
            });
        }

        let record = self.store().get(&CacheKey::full(entry.id.as_str())).await?;
        if !record.is_ok() {
            return None;
        }
        Some(Wallpaper {
            entry: entry.clone(),
            payload: record.payload?,
            source: PayloadSource::Full,
        })
    }

    async fn load_preview(
        &self,
        entry: &ManifestEntry,
        user: &[ManifestEntry],
    ) -> Option<Wallpaper> {
        if is_user_entry(entry, user) {
            let asset = self.library.get(&entry.id).await?;
            return Some(Wallpaper {
                entry: entry.clone(),
                payload: asset.preview?,
                source: PayloadSource::User,
            });
        }

        let record = self
            .store()
            .get(&CacheKey::preview(entry.id.as_str()))
            .await?;
        if !record.is_ok() {
            return None;
        }
        Some(Wallpaper {
            entry: entry.clone(),
            payload: record.payload?,
            source: PayloadSource::Preview,
        })
    }
}

fn is_user_entry(entry: &ManifestEntry, user: &[ManifestEntry]) -> bool {
    user.iter().any(|candidate| candidate.id == entry.id)
}

//! One reconciliation pass between the remote manifest and the local store.

use crate::{DownloadOutcome, SyncConfig, SyncHandle, SyncReport};
use backdrop_core::{Manifest, ManifestEntry, MediaType, resolve_asset_url};
use backdrop_error::BackdropResult;
use backdrop_fetch::{Transport, fetch_binary_with_retry, fetch_manifest, run_bounded};
use backdrop_store::{CacheKey, CacheRecord, CacheStore, Kind};
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// A payload to fetch for one manifest entry.
#[derive(Debug, Clone)]
pub(crate) struct DownloadJob {
    pub entry: ManifestEntry,
    pub kind: Kind,
}

impl DownloadJob {
    pub fn key(&self) -> CacheKey {
        CacheKey::new(self.entry.id.clone(), self.kind)
    }
}

/// Keeps a [`CacheStore`] in step with the remote manifest.
///
/// Cloning is cheap; clones share the store and transport.
#[derive(Debug)]
pub struct Synchronizer<S, T> {
    store: Arc<S>,
    transport: Arc<T>,
    config: SyncConfig,
    asset_base: Url,
}

impl<S, T> Clone for Synchronizer<S, T> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            transport: Arc::clone(&self.transport),
            config: self.config.clone(),
            asset_base: self.asset_base.clone(),
        }
    }
}

impl<S, T> Synchronizer<S, T>
where
    S: CacheStore + 'static,
    T: Transport + 'static,
{
    /// Create a synchronizer over an injected store and transport.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the asset base URL does not parse.
    pub fn new(store: Arc<S>, transport: Arc<T>, config: SyncConfig) -> BackdropResult<Self> {
        let asset_base = config.asset_base()?;
        Ok(Self {
            store,
            transport,
            config,
            asset_base,
        })
    }

    /// The store being kept in sync.
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// The active settings.
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Run one pass, logging instead of returning failures.
    pub async fn sync(&self) {
        match self.run_pass().await {
            Ok(report) => info!(%report, "Sync pass finished"),
            Err(e) => warn!(error = %e, "Sync pass aborted"),
        }
    }

    /// Run one pass on the runtime without waiting for it.
    pub fn spawn_sync(&self) -> SyncHandle {
        let this = self.clone();
        SyncHandle::new(tokio::spawn(async move {
            let result = this.run_pass().await;
            if let Err(e) = &result {
                warn!(error = %e, "Background sync pass aborted");
            }
            result
        }))
    }

    /// Run one full reconciliation pass.
    ///
    /// Fetches the manifest, persists it, prunes retired assets, downloads
    /// new or changed previews and warms the first full asset of each media
    /// type. Individual download failures are recorded in the store and the
    /// report; they never abort the pass.
    ///
    /// # Errors
    ///
    /// Returns an error if the manifest cannot be fetched or persisted. The
    /// store is left untouched when the fetch fails.
    #[instrument(skip(self), fields(url = %self.config.manifest_url()))]
    pub async fn run_pass(&self) -> BackdropResult<SyncReport> {
        let manifest = fetch_manifest(
            self.transport.as_ref(),
            self.config.manifest_url(),
            *self.config.manifest_timeout(),
        )
        .await?;

        let prior = self.store.load_manifest().await;
        self.store.save_manifest(&manifest).await?;
        info!(
            version = %manifest.version,
            prior = prior.as_ref().map(|m| m.version.as_str()).unwrap_or("none"),
            entries = manifest.len(),
            "Applied manifest"
        );

        let mut report = SyncReport {
            manifest_version: manifest.version.clone(),
            entries: manifest.len(),
            ..SyncReport::default()
        };

        report.pruned = self.prune(&manifest).await;

        let previews = self.plan_previews(&manifest, prior.as_ref(), &mut report).await;
        report.previews = self
            .run_jobs(previews, *self.config.preview_concurrency())
            .await;

        let warm = self.plan_warm_up(&manifest).await;
        report.warmed = self.run_jobs(warm, *self.config.full_concurrency()).await;

        Ok(report)
    }

    /// Delete records of assets the manifest no longer lists.
    async fn prune(&self, manifest: &Manifest) -> Vec<String> {
        let live: HashSet<&str> = manifest
            .entries()
            .filter(|entry| !entry.id.is_empty())
            .map(|entry| entry.id.as_str())
            .collect();

        // Retired previews take their full payload with them; full records
        // with no preview left behind are orphans and go too.
        let mut retired: BTreeMap<String, CacheKey> = BTreeMap::new();
        for key in self.store.list_keys().await {
            if !live.contains(key.asset_id()) {
                retired.entry(key.asset_id().to_string()).or_insert(key);
            }
        }

        let mut pruned = Vec::new();
        for (asset_id, key) in retired {
            let mut removed = true;
            let paired = key.paired();
            for key in [key, paired] {
                if let Err(e) = self.store.delete(&key).await {
                    warn!(key = %key, error = %e, "Failed to prune record");
                    removed = false;
                }
            }
            if removed {
                debug!(asset_id = %asset_id, "Pruned retired asset");
                pruned.push(asset_id);
            }
        }
        pruned
    }

    /// Preview downloads needed for this manifest.
    ///
    /// An entry is current when the prior manifest had the same non-empty
    /// version for its id and its preview record is ok.
    async fn plan_previews(
        &self,
        manifest: &Manifest,
        prior: Option<&Manifest>,
        report: &mut SyncReport,
    ) -> Vec<DownloadJob> {
        let prior_versions = prior.map(Manifest::versions).unwrap_or_default();
        let mut seen = HashSet::new();
        let mut jobs = Vec::new();

        for entry in manifest.entries() {
            if let Err(e) = entry.validate() {
                warn!(error = %e, "Skipping invalid manifest entry");
                report.invalid += 1;
                continue;
            }
            if !seen.insert(entry.id.as_str()) {
                debug!(id = %entry.id, "Duplicate manifest id, keeping first");
                continue;
            }

            let unchanged = prior_versions
                .get(entry.id.as_str())
                .is_some_and(|v| !v.is_empty() && *v == entry.version);
            if unchanged {
                let preview_ok = self
                    .store
                    .get(&CacheKey::preview(entry.id.as_str()))
                    .await
                    .is_some_and(|record| record.is_ok());
                if preview_ok {
                    report.skipped += 1;
                    continue;
                }
            }

            jobs.push(DownloadJob {
                entry: entry.clone(),
                kind: Kind::Preview,
            });
        }

        debug!(queued = jobs.len(), skipped = report.skipped, "Planned preview downloads");
        jobs
    }

    /// Full-asset downloads for the first image and the first video.
    async fn plan_warm_up(&self, manifest: &Manifest) -> Vec<DownloadJob> {
        let mut jobs = Vec::new();
        for media_type in [MediaType::Image, MediaType::Video] {
            let Some(entry) = manifest.first_of(media_type) else {
                continue;
            };
            if entry.validate().is_err() {
                continue;
            }
            let current = self
                .store
                .get(&CacheKey::full(entry.id.as_str()))
                .await
                .is_some_and(|record| {
                    record.is_ok() && record.version.as_deref().is_none_or(|v| v == entry.version)
                });
            if current {
                debug!(id = %entry.id, "Full asset already warm");
                continue;
            }
            jobs.push(DownloadJob {
                entry: entry.clone(),
                kind: Kind::Full,
            });
        }
        jobs
    }

    pub(crate) async fn run_jobs(
        &self,
        jobs: Vec<DownloadJob>,
        concurrency: usize,
    ) -> Vec<DownloadOutcome> {
        if jobs.is_empty() {
            return Vec::new();
        }
        let keys: Vec<CacheKey> = jobs.iter().map(DownloadJob::key).collect();
        let results = run_bounded(jobs, |job| self.download_and_store(job), concurrency).await;
        keys.into_iter()
            .zip(results)
            .map(|(key, result)| DownloadOutcome { key, result })
            .collect()
    }

    /// Download one payload and record the outcome in the store.
    ///
    /// A network failure is recorded as a failed record and returned as a
    /// fetch error. A payload that arrives but cannot be written is returned
    /// as a storage error.
    #[instrument(skip(self, job), fields(key = %job.key()))]
    pub(crate) async fn download_and_store(&self, job: DownloadJob) -> BackdropResult<usize> {
        let DownloadJob { entry, kind } = job;
        let key = CacheKey::new(entry.id.clone(), kind);
        let raw = match kind {
            Kind::Preview => &entry.preview_url,
            Kind::Full => &entry.full_url,
        };

        let url = match resolve_asset_url(&self.asset_base, &entry.id, raw) {
            Ok(url) => url,
            Err(e) => {
                self.record_failure(&key, &entry, &e.kind.to_string()).await;
                return Err(e.into());
            }
        };

        match fetch_binary_with_retry(
            self.transport.as_ref(),
            url.as_str(),
            *self.config.max_attempts(),
            *self.config.base_delay(),
        )
        .await
        {
            Ok(bytes) => {
                let size = bytes.len();
                self.store
                    .put(&CacheRecord::stored(key, Some(&entry), bytes))
                    .await?;
                debug!(size, "Stored payload");
                Ok(size)
            }
            Err(e) => {
                self.record_failure(&key, &entry, &e.kind.to_string()).await;
                Err(e.into())
            }
        }
    }

    async fn record_failure(&self, key: &CacheKey, entry: &ManifestEntry, message: &str) {
        let record = CacheRecord::failed(key.clone(), Some(entry), message);
        if let Err(e) = self.store.put(&record).await {
            warn!(key = %key, error = %e, "Failed to record download failure");
        }
    }
}

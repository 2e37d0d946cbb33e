//! On-demand downloads outside the sync pass.

use crate::synchronizer::DownloadJob;
use crate::{DownloadOutcome, Synchronizer};
use backdrop_core::ManifestEntry;
use backdrop_error::{BackdropResult, StorageError, StorageErrorKind};
use backdrop_fetch::Transport;
use backdrop_store::{CacheKey, CacheStore, Kind};
use tracing::{info, instrument, warn};

impl<S, T> Synchronizer<S, T>
where
    S: CacheStore + 'static,
    T: Transport + 'static,
{
    /// Retry every preview of the persisted manifest that is not stored ok.
    ///
    /// Uses the configured repair concurrency unless `concurrency` is given.
    /// Returns one outcome per retried entry, in manifest order; an empty list
    /// when nothing is missing.
    ///
    /// # Errors
    ///
    /// Returns [`StorageErrorKind::NotFound`] if no manifest was ever persisted.
    #[instrument(skip(self))]
    pub async fn redownload_missing(
        &self,
        concurrency: Option<usize>,
    ) -> BackdropResult<Vec<DownloadOutcome>> {
        let Some(manifest) = self.store().load_manifest().await else {
            warn!("No persisted manifest, cannot repair");
            return Err(StorageError::new(StorageErrorKind::NotFound(
                "no manifest has been synced".to_string(),
            ))
            .into());
        };

        let mut jobs = Vec::new();
        for entry in manifest.entries() {
            if entry.validate().is_err() {
                continue;
            }
            let key = CacheKey::preview(entry.id.as_str());
            let ok = self.store().get(&key).await.is_some_and(|r| r.is_ok());
            if !ok && !jobs.iter().any(|job: &DownloadJob| job.entry.id == entry.id) {
                jobs.push(DownloadJob {
                    entry: entry.clone(),
                    kind: Kind::Preview,
                });
            }
        }

        info!(missing = jobs.len(), "Repairing missing previews");
        let concurrency = concurrency.unwrap_or(*self.config().repair_concurrency());
        Ok(self.run_jobs(jobs, concurrency).await)
    }

    /// Fetch the full-resolution payload of one entry now.
    ///
    /// An ok full record for the same version is reused without touching the
    /// network.
    #[instrument(skip(self, entry), fields(id = %entry.id))]
    pub async fn download_full_asset(&self, entry: &ManifestEntry) -> DownloadOutcome {
        let key = CacheKey::full(entry.id.as_str());
        if let Err(e) = entry.validate() {
            return DownloadOutcome {
                key,
                result: Err(e.into()),
            };
        }

        if let Some(record) = self.store().get(&key).await {
            let same_version = record.version.as_deref().is_none_or(|v| v == entry.version);
            if record.is_ok() && same_version {
                return DownloadOutcome {
                    key,
                    result: Ok(record.size()),
                };
            }
        }

        let result = self
            .download_and_store(DownloadJob {
                entry: entry.clone(),
                kind: Kind::Full,
            })
            .await;
        DownloadOutcome { key, result }
    }
}

//! Sync pass and repair results.

use backdrop_error::BackdropResult;
use backdrop_store::CacheKey;
use std::fmt;

/// Result of downloading and storing one payload.
///
/// `result` holds the stored payload size. A network failure is a
/// [`backdrop_error::BackdropErrorKind::Fetch`] error; a download that succeeded
/// but could not be written is a [`backdrop_error::BackdropErrorKind::Storage`]
/// error.
#[derive(Debug, Clone)]
pub struct DownloadOutcome {
    /// Key the payload was stored under
    pub key: CacheKey,
    /// Stored size, or why nothing usable was stored
    pub result: BackdropResult<usize>,
}

impl DownloadOutcome {
    /// Whether the payload is now stored.
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }

    /// Whether the download itself failed.
    pub fn is_network_failure(&self) -> bool {
        self.result.as_ref().is_err_and(|e| e.is_network())
    }

    /// Whether the payload arrived but could not be stored.
    pub fn is_storage_failure(&self) -> bool {
        self.result.as_ref().is_err_and(|e| e.is_storage())
    }
}

/// Summary of one sync pass.
#[derive(Debug, Clone, Default)]
pub struct SyncReport {
    /// Version of the manifest that was applied
    pub manifest_version: String,
    /// Entries listed by the manifest
    pub entries: usize,
    /// Asset ids whose records were removed
    pub pruned: Vec<String>,
    /// Entries whose preview was already current
    pub skipped: usize,
    /// Entries ignored because they lack an id or URL
    pub invalid: usize,
    /// Preview downloads, in manifest order
    pub previews: Vec<DownloadOutcome>,
    /// Full-asset warm-up downloads
    pub warmed: Vec<DownloadOutcome>,
}

impl SyncReport {
    /// Every download attempted during the pass.
    pub fn downloads(&self) -> impl Iterator<Item = &DownloadOutcome> {
        self.previews.iter().chain(self.warmed.iter())
    }

    /// Number of downloads attempted.
    pub fn attempted(&self) -> usize {
        self.previews.len() + self.warmed.len()
    }

    /// Number of downloads that did not end with a stored payload.
    pub fn failed(&self) -> usize {
        self.downloads().filter(|d| !d.is_ok()).count()
    }
}

impl fmt::Display for SyncReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "manifest {} ({} entries): {} downloaded, {} failed, {} current, {} pruned, {} invalid",
            self.manifest_version,
            self.entries,
            self.attempted() - self.failed(),
            self.failed(),
            self.skipped,
            self.pruned.len(),
            self.invalid
        )
    }
}

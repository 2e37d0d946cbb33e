//! User-supplied wallpapers, stored apart from the manifest tiers.

use crate::fs_util::{
    META_EXT, PAYLOAD_EXT, compute_digest, read_optional, remove_if_exists, write_atomic,
};
use backdrop_core::{ManifestEntry, MediaType};
use backdrop_error::{BackdropResult, StorageError, StorageErrorKind};
use chrono::{DateTime, Utc};
use rand::Rng;
use rand::distributions::Alphanumeric;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, instrument, warn};

const ID_PREFIX: &str = "user-wall";
const PREVIEW_EXT: &str = "preview.bin";
const URL_SCHEME: &str = "user://";

/// Listing view of a user asset, without payload bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAssetSummary {
    /// Library-assigned id, `user-wall-{millis}-{random}`
    pub id: String,
    /// Image or video
    pub media_type: MediaType,
    /// Optional display name
    #[serde(default)]
    pub name: Option<String>,
    /// Whether a separate preview payload was saved
    pub has_preview: bool,
    /// Size of the full payload in bytes
    pub size: u64,
    /// SHA-256 of the full payload
    pub digest: String,
    /// Time the asset was last saved
    pub updated_at: DateTime<Utc>,
}

impl UserAssetSummary {
    /// Manifest-shaped entry so user assets can flow through selection.
    pub fn to_entry(&self) -> ManifestEntry {
        let url = format!("{}{}", URL_SCHEME, self.id);
        let mut entry = ManifestEntry::new(
            self.id.clone(),
            self.updated_at.timestamp_millis().to_string(),
            url.clone(),
            url,
            self.media_type,
        );
        entry.name = self.name.clone();
        entry
    }
}

/// A user asset with its payloads loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct UserAsset {
    /// Metadata
    pub summary: UserAssetSummary,
    /// Full payload
    pub payload: Vec<u8>,
    /// Preview payload, if one was saved
    pub preview: Option<Vec<u8>>,
}

/// Directory-backed library of user wallpapers.
///
/// Each asset is `{id}.json` (summary), `{id}.bin` (payload) and optionally
/// `{id}.preview.bin`.
#[derive(Debug, Clone)]
pub struct UserLibrary {
    dir: PathBuf,
}

impl UserLibrary {
    /// Library stored in `dir`. The directory is created on first save.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the library.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Save a user asset, returning its id.
    ///
    /// Passing `existing_id` overwrites that asset; otherwise a fresh id is
    /// generated.
    ///
    /// # Errors
    ///
    /// Returns an error if `existing_id` is not a valid library id or the
    /// files cannot be written.
    #[instrument(skip(self, payload, preview), fields(size = payload.len()))]
    pub async fn save(
        &self,
        payload: &[u8],
        media_type: MediaType,
        name: Option<String>,
        preview: Option<&[u8]>,
        existing_id: Option<&str>,
    ) -> BackdropResult<String> {
        let id = match existing_id {
            Some(id) => {
                check_id(id)?;
                id.to_string()
            }
            None => generate_id(),
        };

        tokio::fs::create_dir_all(&self.dir).await.map_err(|e| {
            StorageError::new(StorageErrorKind::DirectoryCreation(format!(
                "{}: {}",
                self.dir.display(),
                e
            )))
        })?;

        write_atomic(&self.payload_path(&id), payload).await?;
        match preview {
            Some(bytes) => write_atomic(&self.preview_path(&id), bytes).await?,
            None => remove_if_exists(&self.preview_path(&id)).await?,
        }

        let summary = UserAssetSummary {
            id: id.clone(),
            media_type,
            name,
            has_preview: preview.is_some(),
            size: payload.len() as u64,
            digest: compute_digest(payload),
            updated_at: Utc::now(),
        };
        let meta = serde_json::to_vec_pretty(&summary).map_err(|e| {
            StorageError::new(StorageErrorKind::Serialization(format!("{}: {}", id, e)))
        })?;
        write_atomic(&self.meta_path(&id), &meta).await?;

        debug!(id = %id, "Saved user asset");
        Ok(id)
    }

    /// Every saved asset, oldest first, without payloads.
    pub async fn list(&self) -> Vec<UserAssetSummary> {
        let mut dir = match tokio::fs::read_dir(&self.dir).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                warn!(path = %self.dir.display(), error = %e, "Failed to list user library");
                return Vec::new();
            }
        };

        let mut summaries = Vec::new();
        while let Ok(Some(entry)) = dir.next_entry().await {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(META_EXT) {
                continue;
            }
            match self.read_summary(&path).await {
                Ok(Some(summary)) => summaries.push(summary),
                Ok(None) => {}
                Err(e) => warn!(path = %path.display(), error = %e, "Skipping unreadable user asset"),
            }
        }
        summaries.sort_by(|a, b| a.updated_at.cmp(&b.updated_at).then(a.id.cmp(&b.id)));
        summaries
    }

    /// Summaries of one media type as manifest entries.
    pub async fn entries(&self, media_type: MediaType) -> Vec<ManifestEntry> {
        self.list()
            .await
            .iter()
            .filter(|summary| summary.media_type == media_type)
            .map(UserAssetSummary::to_entry)
            .collect()
    }

    /// Load one asset with its payloads.
    ///
    /// Missing, unreadable or corrupt assets read as `None`.
    #[instrument(skip(self))]
    pub async fn get(&self, id: &str) -> Option<UserAsset> {
        if check_id(id).is_err() {
            return None;
        }
        match self.read_asset(id).await {
            Ok(asset) => asset,
            Err(e) => {
                warn!(error = %e, "User asset unreadable, treating as absent");
                None
            }
        }
    }

    /// Remove an asset. Removing an unknown id succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error if the id is malformed or a file cannot be removed.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> BackdropResult<()> {
        check_id(id)?;
        remove_if_exists(&self.meta_path(id)).await?;
        remove_if_exists(&self.payload_path(id)).await?;
        remove_if_exists(&self.preview_path(id)).await?;
        debug!("Deleted user asset");
        Ok(())
    }

    async fn read_summary(&self, path: &Path) -> Result<Option<UserAssetSummary>, StorageError> {
        let Some(bytes) = read_optional(path).await? else {
            return Ok(None);
        };
        serde_json::from_slice(&bytes).map(Some).map_err(|e| {
            StorageError::new(StorageErrorKind::Serialization(format!(
                "{}: {}",
                path.display(),
                e
            )))
        })
    }

    async fn read_asset(&self, id: &str) -> Result<Option<UserAsset>, StorageError> {
        let Some(summary) = self.read_summary(&self.meta_path(id)).await? else {
            return Ok(None);
        };
        let path = self.payload_path(id);
        let payload = read_optional(&path)
            .await?
            .ok_or_else(|| StorageError::new(StorageErrorKind::NotFound(path.display().to_string())))?;
        if compute_digest(&payload) != summary.digest {
            return Err(StorageError::new(StorageErrorKind::IntegrityMismatch(id.to_string())));
        }
        let preview = if summary.has_preview {
            read_optional(&self.preview_path(id)).await?
        } else {
            None
        };
        Ok(Some(UserAsset {
            summary,
            payload,
            preview,
        }))
    }

    fn meta_path(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", id, META_EXT))
    }

    fn payload_path(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", id, PAYLOAD_EXT))
    }

    fn preview_path(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", id, PREVIEW_EXT))
    }
}

fn generate_id() -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(6)
        .map(char::from)
        .collect::<String>()
        .to_lowercase();
    format!("{}-{}-{}", ID_PREFIX, Utc::now().timestamp_millis(), suffix)
}

/// Ids become file names, so only a safe alphabet is accepted.
fn check_id(id: &str) -> Result<(), StorageError> {
    let valid = !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(StorageError::new(StorageErrorKind::InvalidKey(id.to_string())))
    }
}

//! Remote manifest model.

use crate::MediaType;
use backdrop_error::{EntryError, EntryErrorKind};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One asset published in the manifest.
///
/// The wire format accepts both `previewUrl`/`fullUrl` and the older
/// `thumbnail`/`asset` field names. `mediaType` is implied by the list the
/// entry appears in and is filled in by [`Manifest::normalize`].
///
/// # Examples
///
/// ```
/// use backdrop_core::{ManifestEntry, MediaType};
///
/// let entry: ManifestEntry = serde_json::from_str(
///     r#"{"id": "img-001", "version": "2", "thumbnail": "t/1.webp", "asset": "a/1.jpg"}"#,
/// ).unwrap();
///
/// assert_eq!(entry.preview_url, "t/1.webp");
/// assert_eq!(entry.full_url, "a/1.jpg");
/// assert_eq!(entry.media_type, MediaType::Image);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestEntry {
    /// Stable, manifest-assigned asset id
    #[serde(default)]
    pub id: String,
    /// Version string; a change triggers a re-download
    #[serde(default)]
    pub version: String,
    /// Human-readable name, if the manifest provides one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// URL or relative path of the small preview payload
    #[serde(default, alias = "thumbnail")]
    pub preview_url: String,
    /// URL or relative path of the full-resolution payload
    #[serde(default, alias = "asset")]
    pub full_url: String,
    /// Image or video
    #[serde(default)]
    pub media_type: MediaType,
}

impl ManifestEntry {
    /// Create an entry with every required field set.
    pub fn new(
        id: impl Into<String>,
        version: impl Into<String>,
        preview_url: impl Into<String>,
        full_url: impl Into<String>,
        media_type: MediaType,
    ) -> Self {
        Self {
            id: id.into(),
            version: version.into(),
            name: None,
            preview_url: preview_url.into(),
            full_url: full_url.into(),
            media_type,
        }
    }

    /// Name to show for this asset, falling back to its id.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }

    /// Check that the entry can be downloaded at all.
    ///
    /// # Errors
    ///
    /// Returns an error if the id or either URL is blank.
    pub fn validate(&self) -> Result<(), EntryError> {
        if self.id.trim().is_empty() {
            return Err(EntryError::new(EntryErrorKind::MissingId));
        }
        if self.preview_url.trim().is_empty() {
            return Err(EntryError::new(EntryErrorKind::MissingUrl {
                id: self.id.clone(),
                kind: "preview".to_string(),
            }));
        }
        if self.full_url.trim().is_empty() {
            return Err(EntryError::new(EntryErrorKind::MissingUrl {
                id: self.id.clone(),
                kind: "full".to_string(),
            }));
        }
        Ok(())
    }
}

/// Version-tagged descriptor of every published asset.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Manifest {
    /// Manifest version
    pub version: String,
    /// Image entries, in publication order
    #[serde(default)]
    pub images: Vec<ManifestEntry>,
    /// Video entries, in publication order
    #[serde(default)]
    pub videos: Vec<ManifestEntry>,
}

impl Manifest {
    /// Stamp every entry with the media type of the list it lives in.
    pub fn normalize(mut self) -> Self {
        for entry in &mut self.images {
            entry.media_type = MediaType::Image;
        }
        for entry in &mut self.videos {
            entry.media_type = MediaType::Video;
        }
        self
    }

    /// All entries, images first.
    pub fn entries(&self) -> impl Iterator<Item = &ManifestEntry> {
        self.images.iter().chain(self.videos.iter())
    }

    /// Entries of one media type.
    pub fn entries_of(&self, media_type: MediaType) -> &[ManifestEntry] {
        match media_type {
            MediaType::Image => &self.images,
            MediaType::Video => &self.videos,
        }
    }

    /// First entry of one media type, if any.
    pub fn first_of(&self, media_type: MediaType) -> Option<&ManifestEntry> {
        self.entries_of(media_type).first()
    }

    /// Look up an entry by id across both lists.
    pub fn find(&self, id: &str) -> Option<&ManifestEntry> {
        self.entries().find(|entry| entry.id == id)
    }

    /// Map of asset id to version, skipping entries without an id.
    pub fn versions(&self) -> HashMap<&str, &str> {
        self.entries()
            .filter(|entry| !entry.id.is_empty())
            .map(|entry| (entry.id.as_str(), entry.version.as_str()))
            .collect()
    }

    /// Total number of entries.
    pub fn len(&self) -> usize {
        self.images.len() + self.videos.len()
    }

    /// Whether the manifest lists no assets.
    pub fn is_empty(&self) -> bool {
        self.images.is_empty() && self.videos.is_empty()
    }
}

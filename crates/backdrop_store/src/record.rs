//! Cache record types.

use crate::{CacheKey, Kind};
use backdrop_core::ManifestEntry;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome stored for one download attempt.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    /// Payload downloaded and stored
    #[display("ok")]
    Ok,
    /// Download failed; the record is a negative cache entry
    #[display("failed")]
    Failed,
}

/// One stored outcome for an `(asset, kind)` pair.
///
/// A failed record carries no payload and an error message. It is retried on
/// the next sync pass or through the repair API.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheRecord {
    /// Record key
    pub key: CacheKey,
    /// Payload bytes (None for failed records)
    pub payload: Option<Vec<u8>>,
    /// Whether the download succeeded
    pub status: RecordStatus,
    /// Failure reason for failed records
    pub error_message: Option<String>,
    /// Human-readable asset name
    pub display_name: Option<String>,
    /// Manifest version the record was downloaded for
    pub version: Option<String>,
    /// Snapshot of the manifest entry at download time
    pub manifest_entry: Option<ManifestEntry>,
    /// Time of the last write
    pub updated_at: DateTime<Utc>,
}

impl CacheRecord {
    /// Record a successful download.
    pub fn stored(key: CacheKey, entry: Option<&ManifestEntry>, payload: Vec<u8>) -> Self {
        Self {
            key,
            payload: Some(payload),
            status: RecordStatus::Ok,
            error_message: None,
            display_name: entry.map(|e| e.display_name().to_string()),
            version: entry.map(|e| e.version.clone()),
            manifest_entry: entry.cloned(),
            updated_at: Utc::now(),
        }
    }

    /// Record a failed download.
    pub fn failed(
        key: CacheKey,
        entry: Option<&ManifestEntry>,
        error_message: impl Into<String>,
    ) -> Self {
        Self {
            key,
            payload: None,
            status: RecordStatus::Failed,
            error_message: Some(error_message.into()),
            display_name: entry.map(|e| e.display_name().to_string()),
            version: entry.map(|e| e.version.clone()),
            manifest_entry: entry.cloned(),
            updated_at: Utc::now(),
        }
    }

    /// Asset id of the record.
    pub fn asset_id(&self) -> &str {
        self.key.asset_id()
    }

    /// Payload kind of the record.
    pub fn kind(&self) -> Kind {
        self.key.kind()
    }

    /// Whether the record holds a usable payload.
    pub fn is_ok(&self) -> bool {
        self.status == RecordStatus::Ok && self.payload.is_some()
    }

    /// Payload size in bytes, zero for failed records.
    pub fn size(&self) -> usize {
        self.payload.as_ref().map_or(0, Vec::len)
    }
}

/// On-disk form of a record, without its payload.
///
/// The key is kept as a raw string so records written by older layouts can
/// still be listed and routed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct StoredRecord {
    pub key: String,
    pub status: RecordStatus,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub manifest_entry: Option<ManifestEntry>,
    pub updated_at: DateTime<Utc>,
    /// SHA-256 of the payload, hex encoded
    #[serde(default)]
    pub digest: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
}

impl StoredRecord {
    pub fn from_record(record: &CacheRecord, digest: Option<String>) -> Self {
        Self {
            key: record.key.to_string(),
            status: record.status,
            error_message: record.error_message.clone(),
            display_name: record.display_name.clone(),
            version: record.version.clone(),
            manifest_entry: record.manifest_entry.clone(),
            updated_at: record.updated_at,
            digest,
            size: record.payload.as_ref().map(|p| p.len() as u64),
        }
    }

    pub fn into_record(self, key: CacheKey, payload: Option<Vec<u8>>) -> CacheRecord {
        CacheRecord {
            key,
            payload,
            status: self.status,
            error_message: self.error_message,
            display_name: self.display_name,
            version: self.version,
            manifest_entry: self.manifest_entry,
            updated_at: self.updated_at,
        }
    }
}

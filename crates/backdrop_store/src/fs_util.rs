//! Filesystem helpers shared by the tier store and the user library.

use crate::record::StoredRecord;
use backdrop_error::{StorageError, StorageErrorKind};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

pub(crate) const META_EXT: &str = "json";
pub(crate) const PAYLOAD_EXT: &str = "bin";

/// Hex SHA-256 of some bytes.
pub(crate) fn compute_digest(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}

/// File stem for a raw key. Keys are free-form, so they are hashed.
pub(crate) fn file_stem(raw_key: &str) -> String {
    compute_digest(raw_key.as_bytes())
}

/// Write to a temp file, then rename over the destination.
pub(crate) async fn write_atomic(path: &Path, data: &[u8]) -> Result<(), StorageError> {
    let ext = path
        .extension()
        .map(|e| format!("{}.tmp", e.to_string_lossy()))
        .unwrap_or_else(|| "tmp".to_string());
    let temp_path = path.with_extension(ext);

    tokio::fs::write(&temp_path, data).await.map_err(|e| {
        StorageError::new(StorageErrorKind::FileWrite(format!(
            "{}: {}",
            temp_path.display(),
            e
        )))
    })?;

    tokio::fs::rename(&temp_path, path).await.map_err(|e| {
        StorageError::new(StorageErrorKind::FileWrite(format!(
            "rename {} to {}: {}",
            temp_path.display(),
            path.display(),
            e
        )))
    })
}

/// Remove a file, treating a missing file as success.
pub(crate) async fn remove_if_exists(path: &Path) -> Result<(), StorageError> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(StorageError::new(StorageErrorKind::FileWrite(format!(
            "delete {}: {}",
            path.display(),
            e
        )))),
    }
}

/// Read a file, mapping a missing file to `None`.
pub(crate) async fn read_optional(path: &Path) -> Result<Option<Vec<u8>>, StorageError> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(StorageError::new(StorageErrorKind::FileRead(format!(
            "{}: {}",
            path.display(),
            e
        )))),
    }
}

/// Read and decode record metadata.
pub(crate) async fn read_stored_record(path: &Path) -> Result<Option<StoredRecord>, StorageError> {
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

/// Every decodable record in a tier directory, with its metadata path.
///
/// Undecodable files are logged and skipped.
pub(crate) async fn list_stored_records(
    dir: &Path,
) -> Result<Vec<(PathBuf, StoredRecord)>, StorageError> {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => {
            return Err(StorageError::new(StorageErrorKind::FileRead(format!(
                "{}: {}",
                dir.display(),
                e
            ))));
        }
    };

    let mut records = Vec::new();
    loop {
        let entry = entries.next_entry().await.map_err(|e| {
            StorageError::new(StorageErrorKind::FileRead(format!("{}: {}", dir.display(), e)))
        })?;
        let Some(entry) = entry else { break };
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some(META_EXT) {
            continue;
        }
        match read_stored_record(&path).await {
            Ok(Some(record)) => records.push((path, record)),
            Ok(None) => {}
            Err(e) => tracing::warn!(path = %path.display(), error = %e, "Skipping unreadable record"),
        }
    }
    Ok(records)
}

//! Store schema versioning and migration.
//!
//! Schema 1 kept every record in a single undivided directory (today's full
//! tier). Schema 2 splits previews into their own tier. Opening a store whose
//! recorded version is older than [`SCHEMA_VERSION`] moves preview-suffixed
//! records out of the full tier.

use crate::Kind;
use crate::fs_util::{
    META_EXT, PAYLOAD_EXT, list_stored_records, read_optional, remove_if_exists, write_atomic,
};
use backdrop_error::{StorageError, StorageErrorKind};
use std::path::Path;
use tracing::{debug, info, instrument, warn};

/// Current on-disk schema version.
pub const SCHEMA_VERSION: u32 = 2;

const SCHEMA_FILE: &str = "SCHEMA";

/// What a migration run did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MigrationReport {
    /// Preview records moved out of the full tier
    pub moved: usize,
    /// Full-tier records left where they were
    pub kept: usize,
}

/// Recorded schema version; 0 when nothing was recorded.
pub(crate) async fn read_schema_version(root: &Path) -> u32 {
    match read_optional(&root.join(SCHEMA_FILE)).await {
        Ok(Some(bytes)) => String::from_utf8_lossy(&bytes).trim().parse().unwrap_or(0),
        Ok(None) => 0,
        Err(e) => {
            warn!(error = %e, "Failed to read schema version, assuming legacy layout");
            0
        }
    }
}

pub(crate) async fn write_schema_version(root: &Path, version: u32) -> Result<(), StorageError> {
    write_atomic(&root.join(SCHEMA_FILE), version.to_string().as_bytes()).await
}

/// Bring an opened store up to [`SCHEMA_VERSION`].
///
/// Failures are logged and swallowed; the store stays usable either way.
#[instrument(skip(root), fields(root = %root.display()))]
pub(crate) async fn upgrade(root: &Path) {
    let recorded = read_schema_version(root).await;
    if recorded >= SCHEMA_VERSION {
        debug!(recorded, "Store schema is current");
        return;
    }

    info!(recorded, target = SCHEMA_VERSION, "Upgrading store schema");
    match migrate_legacy_previews(root).await {
        Ok(report) => {
            info!(moved = report.moved, kept = report.kept, "Split legacy previews into preview tier");
            if let Err(e) = write_schema_version(root, SCHEMA_VERSION).await {
                warn!(error = %e, "Failed to record schema version");
            }
        }
        Err(e) => warn!(error = %e, "Store migration failed; continuing with current layout"),
    }
}

/// Move preview-suffixed records from the full tier into the preview tier.
///
/// Full-suffixed records are left in place. Running this on an already
/// migrated store moves nothing.
pub(crate) async fn migrate_legacy_previews(root: &Path) -> Result<MigrationReport, StorageError> {
    let full_dir = root.join(Kind::Full.tier_dir());
    let preview_dir = root.join(Kind::Preview.tier_dir());
    tokio::fs::create_dir_all(&preview_dir).await.map_err(|e| {
        StorageError::new(StorageErrorKind::DirectoryCreation(format!(
            "{}: {}",
            preview_dir.display(),
            e
        )))
    })?;

    let mut report = MigrationReport::default();
    for (meta_path, stored) in list_stored_records(&full_dir).await? {
        if Kind::tier_for(&stored.key) != Kind::Preview {
            report.kept += 1;
            continue;
        }

        let Some(stem) = meta_path.file_stem().map(|s| s.to_os_string()) else {
            continue;
        };
        let src_payload = full_dir.join(&stem).with_extension(PAYLOAD_EXT);
        let dst_payload = preview_dir.join(&stem).with_extension(PAYLOAD_EXT);
        let dst_meta = preview_dir.join(&stem).with_extension(META_EXT);

        if tokio::fs::try_exists(&src_payload).await.unwrap_or(false) {
            move_file(&src_payload, &dst_payload).await?;
        } else {
            remove_if_exists(&dst_payload).await?;
        }
        move_file(&meta_path, &dst_meta).await?;

        debug!(key = %stored.key, "Moved legacy preview record");
        report.moved += 1;
    }

    Ok(report)
}

async fn move_file(from: &Path, to: &Path) -> Result<(), StorageError> {
    remove_if_exists(to).await?;
    tokio::fs::rename(from, to).await.map_err(|e| {
        StorageError::new(StorageErrorKind::FileWrite(format!(
            "move {} to {}: {}",
            from.display(),
            to.display(),
            e
        )))
    })
}

//! Sync, status and repair command handlers.

use super::commands::OutputFormat;
use super::output::{outcome_json, print_json, print_outcomes};
use backdrop::{Backdrop, BackdropResult, CacheKey, CacheRecord, Manifest, RecordStatus};
use backdrop_error::{StorageError, StorageErrorKind};
use tracing::info;

/// Run one sync pass and print its report.
pub async fn run_sync(backdrop: &Backdrop, format: OutputFormat) -> BackdropResult<()> {
    let report = backdrop.refresh().await?;
    info!(version = %report.manifest_version, failed = report.failed(), "Sync finished");

    match format {
        OutputFormat::Json => print_json(&serde_json::json!({
            "manifest_version": report.manifest_version,
            "entries": report.entries,
            "skipped": report.skipped,
            "invalid": report.invalid,
            "pruned": report.pruned,
            "previews": report.previews.iter().map(outcome_json).collect::<Vec<_>>(),
            "warmed": report.warmed.iter().map(outcome_json).collect::<Vec<_>>(),
        })),
        OutputFormat::Human => {
            println!("{}", report);
            print_outcomes(&report.previews);
            print_outcomes(&report.warmed);
            Ok(())
        }
    }
}

/// Print the persisted manifest with the state of each entry's records.
pub async fn show_status(backdrop: &Backdrop, format: OutputFormat) -> BackdropResult<()> {
    let Some(manifest) = backdrop.get_manifest().await else {
        match format {
            OutputFormat::Json => print_json(&serde_json::Value::Null)?,
            OutputFormat::Human => println!("No manifest yet; run `backdrop sync`"),
        }
        return Ok(());
    };

    let mut rows = Vec::with_capacity(manifest.len());
    for entry in manifest.entries() {
        let preview = backdrop
            .get_cache_record(&CacheKey::preview(entry.id.as_str()))
            .await;
        let full = backdrop
            .get_cache_record(&CacheKey::full(entry.id.as_str()))
            .await;
        rows.push((entry, preview, full));
    }

    match format {
        OutputFormat::Json => {
            let entries: Vec<_> = rows
                .iter()
                .map(|(entry, preview, full)| {
                    serde_json::json!({
                        "id": entry.id,
                        "version": entry.version,
                        "media_type": entry.media_type,
                        "preview": record_status(preview.as_ref()),
                        "full": record_status(full.as_ref()),
                    })
                })
                .collect();
            print_json(&serde_json::json!({
                "manifest_version": manifest.version,
                "entries": entries,
            }))
        }
        OutputFormat::Human => {
            println!("Manifest {} ({} entries)", manifest.version, manifest.len());
            println!("{:-<80}", "");
            println!("{:<32} {:<8} {:<12} {:<10} {:<10}", "ID", "TYPE", "VERSION", "PREVIEW", "FULL");
            for (entry, preview, full) in &rows {
                println!(
                    "{:<32} {:<8} {:<12} {:<10} {:<10}",
                    entry.id,
                    entry.media_type,
                    entry.version,
                    record_status(preview.as_ref()),
                    record_status(full.as_ref())
                );
            }
            Ok(())
        }
    }
}

fn record_status(record: Option<&CacheRecord>) -> &'static str {
    match record.map(|r| r.status) {
        Some(RecordStatus::Ok) => "ok",
        Some(RecordStatus::Failed) => "failed",
        None => "-",
    }
}

/// Retry failed or missing previews.
pub async fn repair(backdrop: &Backdrop, concurrency: Option<usize>) -> BackdropResult<()> {
    let outcomes = backdrop.redownload_missing(concurrency).await?;
    if outcomes.is_empty() {
        println!("Nothing to repair");
        return Ok(());
    }

    let failed = outcomes.iter().filter(|o| !o.is_ok()).count();
    println!("Repaired {} of {} previews", outcomes.len() - failed, outcomes.len());
    print_outcomes(&outcomes);
    Ok(())
}

/// Download the full payload of the manifest entry with `id`.
pub async fn fetch_full(backdrop: &Backdrop, id: &str) -> BackdropResult<()> {
    let manifest: Manifest = backdrop.get_manifest().await.unwrap_or_default();
    let entry = manifest.find(id).ok_or_else(|| {
        StorageError::new(StorageErrorKind::NotFound(format!(
            "{} is not in the persisted manifest",
            id
        )))
    })?;

    let outcome = backdrop.download_full_asset(entry).await;
    print_outcomes(std::slice::from_ref(&outcome));
    outcome.result.map(|_| ())
}

/// Print stored keys.
pub async fn list_keys(backdrop: &Backdrop, full_only: bool) -> BackdropResult<()> {
    let keys = if full_only {
        backdrop.list_full_tier_keys().await
    } else {
        backdrop.list_keys().await
    };
    for key in &keys {
        println!("{}", key);
    }
    Ok(())
}

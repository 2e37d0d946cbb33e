//! Tests for the sync pass.

mod test_utils;

use backdrop_core::MediaType;
use backdrop_store::{
    BlobStore, CacheKey, CacheRecord, FileSystemBlobStore, ManifestStore, MemoryBlobStore,
    RecordStatus,
};
use backdrop_sync::Synchronizer;
use std::sync::Arc;
use tempfile::TempDir;
use test_utils::{
    FlakyStore, MockCdn, entry, full_url, manifest, preview_url, test_config,
};

fn catalog(version: &str) -> backdrop_core::Manifest {
    manifest(
        version,
        vec![
            entry("img-1", "1", MediaType::Image),
            entry("img-2", "1", MediaType::Image),
        ],
        vec![entry("vid-1", "1", MediaType::Video)],
    )
}

fn synchronizer<S>(store: Arc<S>, cdn: Arc<MockCdn>) -> Synchronizer<S, MockCdn>
where
    S: backdrop_store::CacheStore + 'static,
{
    Synchronizer::new(store, cdn, test_config()).unwrap()
}

#[tokio::test]
async fn test_first_pass_downloads_previews_and_warms_first_of_each_type() {
    let store = Arc::new(MemoryBlobStore::new());
    let cdn = Arc::new(MockCdn::serving(catalog("10")));
    let sync = synchronizer(store.clone(), cdn.clone());

    let report = sync.run_pass().await.unwrap();

    assert_eq!(report.manifest_version, "10");
    assert_eq!(report.previews.len(), 3);
    assert_eq!(report.warmed.len(), 2);
    assert_eq!(report.failed(), 0);

    for id in ["img-1", "img-2", "vid-1"] {
        let record = store.get(&CacheKey::preview(id)).await.unwrap();
        assert!(record.is_ok());
        assert_eq!(record.payload.unwrap(), preview_url(id).into_bytes());
    }
    let full = store.list_full_tier_keys().await;
    assert!(full.contains(&CacheKey::full("img-1")));
    assert!(full.contains(&CacheKey::full("vid-1")));
    assert!(!full.contains(&CacheKey::full("img-2")));

    assert_eq!(store.load_manifest().await.unwrap().version, "10");
}

#[tokio::test]
async fn test_second_pass_with_same_manifest_downloads_nothing() {
    let store = Arc::new(MemoryBlobStore::new());
    let cdn = Arc::new(MockCdn::serving(catalog("10")));
    let sync = synchronizer(store.clone(), cdn.clone());

    sync.run_pass().await.unwrap();
    let before = cdn.asset_requests();

    let report = sync.run_pass().await.unwrap();
    assert_eq!(report.attempted(), 0);
    assert_eq!(report.skipped, 3);
    assert_eq!(cdn.asset_requests(), before);
}

#[tokio::test]
async fn test_version_bump_downloads_exactly_that_preview() {
    let store = Arc::new(MemoryBlobStore::new());
    let cdn = Arc::new(MockCdn::serving(catalog("10")));
    let sync = synchronizer(store.clone(), cdn.clone());
    sync.run_pass().await.unwrap();

    let mut bumped = catalog("11");
    bumped.images[1].version = "2".to_string();
    cdn.publish(bumped);

    let report = sync.run_pass().await.unwrap();
    assert_eq!(report.previews.len(), 1);
    assert_eq!(report.previews[0].key, CacheKey::preview("img-2"));
    assert_eq!(report.warmed.len(), 0);
    assert_eq!(cdn.requests_for(&preview_url("img-2")), 2);

    let record = store.get(&CacheKey::preview("img-2")).await.unwrap();
    assert_eq!(record.version.as_deref(), Some("2"));
}

#[tokio::test]
async fn test_removed_entry_loses_both_records() {
    let store = Arc::new(MemoryBlobStore::new());
    let cdn = Arc::new(MockCdn::serving(catalog("10")));
    let sync = synchronizer(store.clone(), cdn.clone());
    sync.run_pass().await.unwrap();

    // Give img-2 a full payload too, as an on-demand fetch would
    store
        .put(&CacheRecord::stored(CacheKey::full("img-2"), None, vec![1, 2, 3]))
        .await
        .unwrap();

    cdn.publish(manifest(
        "11",
        vec![entry("img-1", "1", MediaType::Image)],
        vec![entry("vid-1", "1", MediaType::Video)],
    ));
    let report = sync.run_pass().await.unwrap();

    assert_eq!(report.pruned, vec!["img-2".to_string()]);
    assert!(store.get(&CacheKey::preview("img-2")).await.is_none());
    assert!(store.get(&CacheKey::full("img-2")).await.is_none());
    assert!(store.get(&CacheKey::preview("img-1")).await.is_some());
}

#[tokio::test]
async fn test_orphaned_full_record_is_pruned() {
    let store = Arc::new(MemoryBlobStore::new());
    store
        .put(&CacheRecord::stored(CacheKey::full("ghost"), None, vec![0]))
        .await
        .unwrap();
    let cdn = Arc::new(MockCdn::serving(catalog("10")));

    let report = synchronizer(store.clone(), cdn).run_pass().await.unwrap();
    assert_eq!(report.pruned, vec!["ghost".to_string()]);
    assert!(store.get(&CacheKey::full("ghost")).await.is_none());
    assert!(store.list_keys().await.iter().all(|key| key.asset_id() != "ghost"));
}

#[tokio::test]
async fn test_network_failure_is_recorded_and_retried_next_pass() {
    let store = Arc::new(MemoryBlobStore::new());
    let cdn = Arc::new(MockCdn::serving(catalog("10")));
    cdn.fail(&preview_url("img-2"));
    let sync = synchronizer(store.clone(), cdn.clone());

    let report = sync.run_pass().await.unwrap();
    assert_eq!(report.failed(), 1);
    let failure = report.downloads().find(|d| !d.is_ok()).unwrap();
    assert_eq!(failure.key, CacheKey::preview("img-2"));
    assert!(failure.is_network_failure());
    // Attempts stay within the retry budget
    assert_eq!(cdn.requests_for(&preview_url("img-2")), 2);

    let record = store.get(&CacheKey::preview("img-2")).await.unwrap();
    assert_eq!(record.status, RecordStatus::Failed);
    assert!(record.error_message.unwrap().contains("503"));

    cdn.heal(&preview_url("img-2"));
    let report = sync.run_pass().await.unwrap();
    assert_eq!(report.previews.len(), 1);
    assert!(report.previews[0].is_ok());
    assert!(store.get(&CacheKey::preview("img-2")).await.unwrap().is_ok());
}

#[tokio::test]
async fn test_storage_failure_is_distinct_from_network_failure() {
    let store = Arc::new(FlakyStore::default());
    store.set_fail_puts(true);
    let cdn = Arc::new(MockCdn::serving(manifest(
        "10",
        vec![entry("img-1", "1", MediaType::Image)],
        vec![],
    )));

    let report = synchronizer(store.clone(), cdn).run_pass().await.unwrap();

    assert_eq!(report.attempted(), 2);
    for outcome in report.downloads() {
        assert!(outcome.is_storage_failure(), "{:?}", outcome);
        assert!(!outcome.is_network_failure());
    }
    // The manifest itself was still persisted
    assert!(store.load_manifest().await.is_some());
}

#[tokio::test]
async fn test_manifest_failure_leaves_store_untouched() {
    let store = Arc::new(MemoryBlobStore::new());
    let cdn = Arc::new(MockCdn::serving(catalog("10")));
    let sync = synchronizer(store.clone(), cdn.clone());
    sync.run_pass().await.unwrap();
    let keys_before = store.list_keys().await;

    cdn.publish(manifest("11", vec![], vec![]));
    cdn.fail_manifest(500);

    let err = sync.run_pass().await.unwrap_err();
    assert!(err.is_network());
    assert_eq!(store.load_manifest().await.unwrap().version, "10");
    assert_eq!(store.list_keys().await, keys_before);

    // Fire-and-forget form swallows the error
    sync.sync().await;
}

#[tokio::test]
async fn test_invalid_entries_are_skipped() {
    let store = Arc::new(MemoryBlobStore::new());
    let mut broken = entry("img-x", "1", MediaType::Image);
    broken.preview_url.clear();
    let mut nameless = entry("", "1", MediaType::Image);
    nameless.id.clear();
    let cdn = Arc::new(MockCdn::serving(manifest(
        "10",
        vec![broken, nameless, entry("img-1", "1", MediaType::Image)],
        vec![],
    )));

    let report = synchronizer(store.clone(), cdn).run_pass().await.unwrap();
    assert_eq!(report.invalid, 2);
    assert_eq!(report.previews.len(), 1);
    assert!(store.get(&CacheKey::preview("img-x")).await.is_none());
}

#[tokio::test]
async fn test_spawned_pass_can_be_awaited() {
    let store = Arc::new(MemoryBlobStore::new());
    let cdn = Arc::new(MockCdn::serving(catalog("10")));
    let sync = synchronizer(store.clone(), cdn);

    let handle = sync.spawn_sync();
    let report = handle.join().await.unwrap();
    assert_eq!(report.previews.len(), 3);
    assert_eq!(store.list_keys().await.len(), 5);
}

#[tokio::test]
async fn test_filesystem_store_survives_restart_without_redownload() {
    let temp_dir = TempDir::new().unwrap();
    let cdn = Arc::new(MockCdn::serving(catalog("10")));

    {
        let store = Arc::new(FileSystemBlobStore::open(temp_dir.path()).await);
        synchronizer(store, cdn.clone()).run_pass().await.unwrap();
    }
    let before = cdn.asset_requests();

    let store = Arc::new(FileSystemBlobStore::open(temp_dir.path()).await);
    let report = synchronizer(store.clone(), cdn.clone()).run_pass().await.unwrap();

    assert_eq!(report.attempted(), 0);
    assert_eq!(cdn.asset_requests(), before);
    assert_eq!(
        store.get(&CacheKey::full("img-1")).await.unwrap().payload.unwrap(),
        full_url("img-1").into_bytes()
    );
}

//! Tests for the Backdrop service facade.

mod test_utils;

use backdrop::{
    CacheKey, CacheRecord, CollectionSource, MediaType, PayloadSource, SelectionMode,
    SelectionState,
};
use backdrop_store::{BlobStore, ManifestStore, MemoryBlobStore};
use test_utils::{StaticCdn, UnreadableStore, entry, full_url, manifest, preview_url, service};

async fn seed(store: &impl BlobStore, key: CacheKey, payload: &[u8]) {
    let entry = entry(key.asset_id(), MediaType::Image);
    store
        .put(&CacheRecord::stored(key, Some(&entry), payload.to_vec()))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_refresh_warms_first_entries_and_resolves_full_payload() {
    let cdn = StaticCdn::new(manifest(&["A", "B"], &["V"]));
    let (backdrop, _dir) = service(MemoryBlobStore::new(), cdn);

    let report = backdrop.refresh().await.unwrap();
    assert_eq!(report.previews.len(), 3);
    assert_eq!(report.warmed.len(), 2);
    assert_eq!(report.failed(), 0);

    let manifest = backdrop.get_manifest().await.unwrap();
    assert_eq!(manifest.version, "2024.1");
    assert!(
        backdrop
            .get_cache_record(&CacheKey::preview("B"))
            .await
            .is_some_and(|r| r.is_ok())
    );

    let full: Vec<String> = backdrop
        .list_full_tier_keys()
        .await
        .iter()
        .map(|k| k.to_string())
        .collect();
    assert_eq!(full, vec!["A::full", "V::full"]);

    // Only A has a full payload among images
    let chosen = backdrop.choose_entry(&SelectionState::default(), None).await;
    assert_eq!(chosen.map(|e| e.id), Some("A".to_string()));

    let wallpaper = backdrop
        .resolve_wallpaper(&SelectionState::default())
        .await
        .unwrap();
    assert_eq!(wallpaper.entry.id, "A");
    assert_eq!(wallpaper.source, PayloadSource::Full);
    assert_eq!(wallpaper.payload, full_url("A").into_bytes());
}

#[tokio::test]
async fn test_background_sync_can_be_joined() {
    let cdn = StaticCdn::new(manifest(&["A"], &[]));
    let (backdrop, _dir) = service(MemoryBlobStore::new(), cdn);

    let handle = backdrop.sync();
    let report = handle.join().await.unwrap();
    assert_eq!(report.entries, 1);
    assert!(backdrop.get_manifest().await.is_some());
    assert_eq!(backdrop.list_keys().await.len(), 2);
}

#[tokio::test]
async fn test_resolve_chooses_again_when_full_payload_is_unreadable() {
    let store = UnreadableStore::default();
    store.hide(CacheKey::full("A"));
    let (backdrop, _dir) = service(store, StaticCdn::new(manifest(&[], &[])));

    backdrop
        .store()
        .save_manifest(&manifest(&["A", "B"], &[]))
        .await
        .unwrap();
    seed(backdrop.store().as_ref(), CacheKey::full("A"), b"full-a").await;
    seed(backdrop.store().as_ref(), CacheKey::full("B"), b"full-b").await;

    let state = SelectionState::default()
        .with_mode(SelectionMode::Specific)
        .with_pinned_id("A");
    let wallpaper = backdrop.resolve_wallpaper(&state).await.unwrap();
    assert_eq!(wallpaper.entry.id, "B");
    assert_eq!(wallpaper.source, PayloadSource::Full);
    assert_eq!(wallpaper.payload, b"full-b");
}

#[tokio::test]
async fn test_resolve_falls_back_to_preview() {
    let store = UnreadableStore::default();
    store.hide(CacheKey::full("A"));
    let (backdrop, _dir) = service(store, StaticCdn::new(manifest(&[], &[])));

    backdrop
        .store()
        .save_manifest(&manifest(&["A"], &[]))
        .await
        .unwrap();
    seed(backdrop.store().as_ref(), CacheKey::full("A"), b"full-a").await;
    seed(backdrop.store().as_ref(), CacheKey::preview("A"), b"preview-a").await;

    let wallpaper = backdrop
        .resolve_wallpaper(&SelectionState::default())
        .await
        .unwrap();
    assert_eq!(wallpaper.entry.id, "A");
    assert_eq!(wallpaper.source, PayloadSource::Preview);
    assert_eq!(wallpaper.payload, b"preview-a");
}

#[tokio::test]
async fn test_resolve_returns_none_without_cached_payloads() {
    let (backdrop, _dir) = service(MemoryBlobStore::new(), StaticCdn::new(manifest(&[], &[])));
    assert!(
        backdrop
            .resolve_wallpaper(&SelectionState::default())
            .await
            .is_none()
    );

    backdrop
        .store()
        .save_manifest(&manifest(&["A"], &[]))
        .await
        .unwrap();
    let state = SelectionState::default().with_media_type(MediaType::Video);
    assert!(backdrop.resolve_wallpaper(&state).await.is_none());
    assert!(backdrop.choose_entry(&state, None).await.is_none());
}

#[tokio::test]
async fn test_user_collection_resolves_from_library() {
    let (backdrop, _dir) = service(MemoryBlobStore::new(), StaticCdn::new(manifest(&["A"], &[])));
    backdrop.refresh().await.unwrap();

    let id = backdrop
        .save_user_asset(
            b"my-photo",
            MediaType::Image,
            Some("Beach".to_string()),
            None,
            None,
        )
        .await
        .unwrap();
    assert!(id.starts_with("user-wall-"));

    let state = SelectionState::default().with_collection_source(CollectionSource::User);
    let wallpaper = backdrop.resolve_wallpaper(&state).await.unwrap();
    assert_eq!(wallpaper.entry.id, id);
    assert_eq!(wallpaper.source, PayloadSource::User);
    assert_eq!(wallpaper.payload, b"my-photo");

    // Removing the only user asset falls back to the predefined collection
    backdrop.delete_user_asset(&id).await.unwrap();
    assert!(backdrop.list_user_assets().await.is_empty());
    let wallpaper = backdrop.resolve_wallpaper(&state).await.unwrap();
    assert_eq!(wallpaper.entry.id, "A");
    assert_eq!(wallpaper.source, PayloadSource::Full);
}

#[tokio::test]
async fn test_repair_and_on_demand_full_download() {
    let cdn = StaticCdn::new(manifest(&["A", "B"], &[]));
    cdn.fail(&preview_url("B"));
    let (backdrop, _dir) = service(MemoryBlobStore::new(), cdn);

    let report = backdrop.refresh().await.unwrap();
    assert_eq!(report.failed(), 1);

    let outcomes = backdrop.redownload_missing(Some(2)).await.unwrap();
    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0].key, CacheKey::preview("B"));
    assert!(outcomes[0].is_network_failure());

    let manifest = backdrop.get_manifest().await.unwrap();
    let b = manifest.find("B").unwrap();
    let outcome = backdrop.download_full_asset(b).await;
    assert!(outcome.is_ok());
    assert!(backdrop.list_full_tier_keys().await.contains(&CacheKey::full("B")));
}

#[tokio::test]
async fn test_repair_before_first_sync_reports_missing_manifest() {
    let (backdrop, _dir) = service(MemoryBlobStore::new(), StaticCdn::new(manifest(&["A"], &[])));
    let err = backdrop.redownload_missing(None).await.unwrap_err();
    assert!(err.is_storage());

    backdrop.refresh().await.unwrap();
    assert!(backdrop.redownload_missing(None).await.unwrap().is_empty());
}

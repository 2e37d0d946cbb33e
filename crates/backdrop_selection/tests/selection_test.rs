//! Tests for the rotation policy.

use backdrop_core::{Manifest, ManifestEntry, MediaType};
use backdrop_selection::{
    CollectionSource, SelectionMode, SelectionState, candidates, choose_entry,
    choose_entry_with_rng,
};
use backdrop_store::CacheKey;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::{BTreeSet, HashSet};

fn image(id: &str) -> ManifestEntry {
    ManifestEntry::new(id, "1", format!("p/{id}"), format!("f/{id}"), MediaType::Image)
}

fn video(id: &str) -> ManifestEntry {
    ManifestEntry::new(id, "1", format!("p/{id}"), format!("f/{id}"), MediaType::Video)
}

fn manifest(images: &[&str], videos: &[&str]) -> Manifest {
    Manifest {
        version: "1".to_string(),
        images: images.iter().map(|id| image(id)).collect(),
        videos: videos.iter().map(|id| video(id)).collect(),
    }
}

fn cached(ids: &[&str]) -> BTreeSet<CacheKey> {
    ids.iter().map(|id| CacheKey::full(*id)).collect()
}

fn pick<'a>(
    manifest: &'a Manifest,
    state: &SelectionState,
    exclude: Option<&str>,
    full: &BTreeSet<CacheKey>,
    user: &'a [ManifestEntry],
) -> Option<&'a str> {
    let mut rng = StdRng::seed_from_u64(42);
    choose_entry_with_rng(manifest, state, exclude, full, user, &mut rng).map(|e| e.id.as_str())
}

#[test]
fn test_specific_falls_back_when_pinned_is_not_cached() {
    let manifest = manifest(&["A", "B"], &[]);
    let full = cached(&["A"]);
    let state = SelectionState::default()
        .with_mode(SelectionMode::Specific)
        .with_pinned_id("B");

    for seed in 0..20 {
        let mut rng = StdRng::seed_from_u64(seed);
        let chosen = choose_entry_with_rng(&manifest, &state, None, &full, &[], &mut rng);
        assert_eq!(chosen.map(|e| e.id.as_str()), Some("A"));
    }
}

#[test]
fn test_specific_returns_pinned_when_cached() {
    let manifest = manifest(&["A", "B", "C"], &[]);
    let full = cached(&["A", "B", "C"]);
    let state = SelectionState::default()
        .with_mode(SelectionMode::Specific)
        .with_pinned_id("C");
    assert_eq!(pick(&manifest, &state, None, &full, &[]), Some("C"));
}

#[test]
fn test_sequence_wraps_around() {
    let manifest = manifest(&["A", "B", "C"], &[]);
    let full = cached(&["A", "B", "C"]);
    let state = SelectionState::default().with_mode(SelectionMode::Sequence);

    assert_eq!(pick(&manifest, &state.clone().with_last_selected_id("A"), None, &full, &[]), Some("B"));
    assert_eq!(pick(&manifest, &state.clone().with_last_selected_id("C"), None, &full, &[]), Some("A"));
    // Unknown or missing last id starts over
    assert_eq!(pick(&manifest, &state.clone().with_last_selected_id("Z"), None, &full, &[]), Some("A"));
    assert_eq!(pick(&manifest, &state, None, &full, &[]), Some("A"));
}

#[test]
fn test_sequence_skips_uncached_entries() {
    let manifest = manifest(&["A", "B", "C"], &[]);
    let full = cached(&["A", "C"]);
    let state = SelectionState::default()
        .with_mode(SelectionMode::Sequence)
        .with_last_selected_id("A");
    assert_eq!(pick(&manifest, &state, None, &full, &[]), Some("C"));
}

#[test]
fn test_exclusion_removes_candidate() {
    let manifest = manifest(&["A", "B"], &[]);
    let full = cached(&["A", "B"]);
    let state = SelectionState::default();

    for seed in 0..20 {
        let mut rng = StdRng::seed_from_u64(seed);
        let chosen = choose_entry_with_rng(&manifest, &state, Some("A"), &full, &[], &mut rng);
        assert_eq!(chosen.map(|e| e.id.as_str()), Some("B"));
    }
}

#[test]
fn test_exclusion_ignored_when_it_would_empty_the_list() {
    let manifest = manifest(&["A"], &[]);
    let full = cached(&["A"]);
    let state = SelectionState::default();
    assert_eq!(pick(&manifest, &state, Some("A"), &full, &[]), Some("A"));
}

#[test]
fn test_nothing_cached_returns_none() {
    let manifest = manifest(&["A", "B"], &["V"]);
    let state = SelectionState::default().with_media_type(MediaType::Video);
    assert_eq!(pick(&manifest, &state, None, &cached(&["A", "B"]), &[]), None);
    assert!(choose_entry(&manifest, &state, None, &BTreeSet::new(), &[]).is_none());
}

#[test]
fn test_media_type_filters_candidates() {
    let manifest = manifest(&["A"], &["V1", "V2"]);
    let full = cached(&["A", "V1", "V2"]);
    let state = SelectionState::default().with_media_type(MediaType::Video);

    let (pool, _) = candidates(&manifest, &state, &full, &[]);
    let ids: Vec<&str> = pool.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec!["V1", "V2"]);
}

#[test]
fn test_user_collection_is_used_when_present() {
    let manifest = manifest(&["A"], &[]);
    let full = cached(&["A"]);
    let user = vec![image("user-wall-1-abc"), video("user-wall-2-def")];
    let state = SelectionState::default()
        .with_collection_source(CollectionSource::User)
        .with_mode(SelectionMode::Specific)
        .with_pinned_id("user-wall-1-abc");

    assert_eq!(pick(&manifest, &state, None, &full, &user), Some("user-wall-1-abc"));
}

#[test]
fn test_empty_user_collection_falls_back_and_downgrades_specific() {
    let manifest = manifest(&["A", "B", "C"], &[]);
    let full = cached(&["A", "B", "C"]);
    // Only a video in the user collection, so no user images
    let user = vec![video("user-wall-2-def")];
    let state = SelectionState::default()
        .with_collection_source(CollectionSource::User)
        .with_mode(SelectionMode::Specific)
        .with_pinned_id("B");

    let (pool, mode) = candidates(&manifest, &state, &full, &user);
    assert_eq!(pool.len(), 3);
    assert_eq!(mode, SelectionMode::Random);

    // Random picks spread across candidates instead of sticking to the pin
    let mut seen = HashSet::new();
    for seed in 0..50 {
        let mut rng = StdRng::seed_from_u64(seed);
        if let Some(entry) = choose_entry_with_rng(&manifest, &state, None, &full, &user, &mut rng) {
            seen.insert(entry.id.clone());
        }
    }
    assert!(seen.len() > 1);
}

#[test]
fn test_state_parses_from_settings_json() {
    let state: SelectionState = serde_json::from_str(
        r#"{"mode": "sequence", "collection_source": "user", "media_type": "video", "last_selected_id": "v-3"}"#,
    )
    .unwrap();
    assert_eq!(*state.mode(), SelectionMode::Sequence);
    assert_eq!(*state.collection_source(), CollectionSource::User);
    assert_eq!(*state.media_type(), MediaType::Video);
    assert_eq!(state.last_selected_id().as_deref(), Some("v-3"));
    assert!(state.pinned_id().is_none());

    assert_eq!("Specific".parse::<SelectionMode>().unwrap(), SelectionMode::Specific);
}

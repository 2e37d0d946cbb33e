//! Test utilities for the Backdrop service.

#![allow(dead_code)]

pub mod static_cdn;
pub mod unreadable_store;

pub use static_cdn::StaticCdn;
pub use unreadable_store::UnreadableStore;

use backdrop::{Backdrop, Manifest, ManifestEntry, MediaType};
use backdrop_fetch::Transport;
use backdrop_store::{CacheStore, UserLibrary};
use backdrop_sync::{SyncConfig, SyncConfigBuilder};
use std::time::Duration;
use tempfile::TempDir;

pub const MANIFEST_URL: &str = "https://cdn.test/manifest.json";

pub fn entry(id: &str, media_type: MediaType) -> ManifestEntry {
    ManifestEntry::new(
        id,
        "1",
        format!("p/{}.webp", id),
        format!("f/{}.bin", id),
        media_type,
    )
}

pub fn manifest(images: &[&str], videos: &[&str]) -> Manifest {
    Manifest {
        version: "2024.1".to_string(),
        images: images.iter().map(|id| entry(id, MediaType::Image)).collect(),
        videos: videos.iter().map(|id| entry(id, MediaType::Video)).collect(),
    }
}

pub fn full_url(id: &str) -> String {
    format!("https://cdn.test/f/{}.bin", id)
}

pub fn preview_url(id: &str) -> String {
    format!("https://cdn.test/p/{}.webp", id)
}

pub fn test_config() -> SyncConfig {
    SyncConfigBuilder::default()
        .manifest_url(MANIFEST_URL)
        .max_attempts(1u32)
        .base_delay(Duration::from_millis(1))
        .build()
        .expect("valid test config")
}

/// Service over `store` and `transport` with a user library in a fresh temp dir.
pub fn service<S, T>(store: S, transport: T) -> (Backdrop<S, T>, TempDir)
where
    S: CacheStore + 'static,
    T: Transport + 'static,
{
    let dir = TempDir::new().expect("temp dir");
    let library = UserLibrary::new(dir.path().join("user"));
    let backdrop =
        Backdrop::with_parts(store, transport, library, test_config()).expect("valid parts");
    (backdrop, dir)
}

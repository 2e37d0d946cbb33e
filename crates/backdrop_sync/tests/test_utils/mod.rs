//! Test utilities for synchronizer tests.
//!
//! Provides a scripted CDN transport, a store whose blob writes can be made
//! to fail, and manifest helpers.

#![allow(dead_code)]

pub mod mock_cdn;
pub mod flaky_store;

pub use flaky_store::FlakyStore;
pub use mock_cdn::MockCdn;

use backdrop_core::{Manifest, ManifestEntry, MediaType};
use backdrop_sync::{SyncConfig, SyncConfigBuilder};
use std::time::Duration;

pub const MANIFEST_URL: &str = "https://cdn.test/manifest.json";

/// Entry whose payloads live under `p/` and `f/` on the mock CDN.
pub fn entry(id: &str, version: &str, media_type: MediaType) -> ManifestEntry {
    ManifestEntry::new(
        id,
        version,
        format!("p/{}.webp", id),
        format!("f/{}.bin", id),
        media_type,
    )
}

pub fn manifest(version: &str, images: Vec<ManifestEntry>, videos: Vec<ManifestEntry>) -> Manifest {
    Manifest {
        version: version.to_string(),
        images,
        videos,
    }
}

/// Preview URL the synchronizer resolves for an id.
pub fn preview_url(id: &str) -> String {
    format!("https://cdn.test/p/{}.webp", id)
}

/// Full URL the synchronizer resolves for an id.
pub fn full_url(id: &str) -> String {
    format!("https://cdn.test/f/{}.bin", id)
}

/// Fast settings: two attempts, millisecond backoff.
pub fn test_config() -> SyncConfig {
    SyncConfigBuilder::default()
        .manifest_url(MANIFEST_URL)
        .max_attempts(2u32)
        .base_delay(Duration::from_millis(1))
        .manifest_timeout(Duration::from_secs(5))
        .build()
        .expect("valid test config")
}

//! Transport serving a fixed manifest.

use super::MANIFEST_URL;
use backdrop::Manifest;
use backdrop_error::FetchError;
use backdrop_fetch::{Transport, TransportResponse};
use std::collections::HashSet;
use std::sync::Mutex;

/// Serves one manifest and echoes each asset URL back as its payload.
pub struct StaticCdn {
    manifest: Manifest,
    failing: Mutex<HashSet<String>>,
}

impl StaticCdn {
    pub fn new(manifest: Manifest) -> Self {
        Self {
            manifest,
            failing: Mutex::new(HashSet::new()),
        }
    }

    /// Make an asset URL answer 503.
    pub fn fail(&self, url: &str) {
        self.failing.lock().unwrap().insert(url.to_string());
    }

    /// Let a failing asset URL succeed again.
    pub fn heal(&self, url: &str) {
        self.failing.lock().unwrap().remove(url);
    }
}

#[async_trait::async_trait]
impl Transport for StaticCdn {
    async fn get(&self, url: &str) -> Result<TransportResponse, FetchError> {
        if url == MANIFEST_URL {
            let body = serde_json::to_vec(&self.manifest).unwrap();
            return Ok(TransportResponse::new(200, body));
        }
        if self.failing.lock().unwrap().contains(url) {
            return Ok(TransportResponse::new(503, Vec::new()));
        }
        Ok(TransportResponse::new(200, url.as_bytes().to_vec()))
    }
}

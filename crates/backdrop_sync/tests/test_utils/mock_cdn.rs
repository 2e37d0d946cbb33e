//! Scripted CDN for synchronizer tests.

use super::MANIFEST_URL;
use backdrop_core::Manifest;
use backdrop_error::FetchError;
use backdrop_fetch::{Transport, TransportResponse};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

/// Serves a manifest and echoes each asset URL back as its payload.
#[derive(Default)]
pub struct MockCdn {
    manifest: Mutex<Option<Manifest>>,
    manifest_status: Mutex<u16>,
    failing: Mutex<HashSet<String>>,
    requests: Mutex<HashMap<String, usize>>,
}

impl MockCdn {
    pub fn serving(manifest: Manifest) -> Self {
        let cdn = Self::default();
        cdn.publish(manifest);
        cdn
    }

    /// Replace the published manifest.
    pub fn publish(&self, manifest: Manifest) {
        *self.manifest.lock().unwrap() = Some(manifest);
        *self.manifest_status.lock().unwrap() = 200;
    }

    /// Make the manifest endpoint answer with `status`.
    pub fn fail_manifest(&self, status: u16) {
        *self.manifest_status.lock().unwrap() = status;
    }

    /// Make an asset URL answer 503.
    pub fn fail(&self, url: &str) {
        self.failing.lock().unwrap().insert(url.to_string());
    }

    /// Let a failing asset URL succeed again.
    pub fn heal(&self, url: &str) {
        self.failing.lock().unwrap().remove(url);
    }

    /// Requests made for one URL.
    pub fn requests_for(&self, url: &str) -> usize {
        self.requests.lock().unwrap().get(url).copied().unwrap_or(0)
    }

    /// Requests made for anything but the manifest.
    pub fn asset_requests(&self) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|(url, _)| url.as_str() != MANIFEST_URL)
            .map(|(_, count)| count)
            .sum()
    }
}

#[async_trait::async_trait]
impl Transport for MockCdn {
    async fn get(&self, url: &str) -> Result<TransportResponse, FetchError> {
        *self.requests.lock().unwrap().entry(url.to_string()).or_default() += 1;

        if url == MANIFEST_URL {
            let status = *self.manifest_status.lock().unwrap();
            if status != 200 {
                return Ok(TransportResponse::new(status, Vec::new()));
            }
            let body = serde_json::to_vec(&*self.manifest.lock().unwrap()).unwrap();
            return Ok(TransportResponse::new(200, body));
        }

        if self.failing.lock().unwrap().contains(url) {
            return Ok(TransportResponse::new(503, Vec::new()));
        }
        Ok(TransportResponse::new(200, url.as_bytes().to_vec()))
    }
}

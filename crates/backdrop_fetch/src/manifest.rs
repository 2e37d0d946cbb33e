//! Manifest download.

use crate::Transport;
use backdrop_core::Manifest;
use backdrop_error::{FetchError, FetchErrorKind};
use std::time::Duration;
use tracing::{debug, instrument};

/// Fetch and parse the remote manifest.
///
/// The request is abandoned once `timeout` elapses. The returned manifest is
/// normalized so every entry carries the media type of its list.
///
/// # Errors
///
/// - [`FetchErrorKind::Timeout`] if no complete response arrived in time
/// - [`FetchErrorKind::HttpStatus`] on a non-2xx status
/// - [`FetchErrorKind::Parse`] if the body is not a manifest or has no string `version`
/// - [`FetchErrorKind::Transport`] if the request could not be made
#[instrument(skip(transport), fields(timeout_ms = timeout.as_millis() as u64))]
pub async fn fetch_manifest<T>(
    transport: &T,
    url: &str,
    timeout: Duration,
) -> Result<Manifest, FetchError>
where
    T: Transport + ?Sized,
{
    let response = tokio::time::timeout(timeout, transport.get(url))
        .await
        .map_err(|_| {
            FetchError::new(FetchErrorKind::Timeout {
                url: url.to_string(),
                timeout_ms: timeout.as_millis() as u64,
            })
        })??;

    if !response.is_success() {
        return Err(FetchError::new(FetchErrorKind::HttpStatus {
            url: url.to_string(),
            status: response.status,
        }));
    }

    let value: serde_json::Value = serde_json::from_slice(&response.body)
        .map_err(|e| FetchError::new(FetchErrorKind::Parse(format!("manifest: {}", e))))?;
    if !value.get("version").is_some_and(serde_json::Value::is_string) {
        return Err(FetchError::new(FetchErrorKind::Parse(
            "manifest has no string version".to_string(),
        )));
    }
    let manifest: Manifest = serde_json::from_value(value)
        .map_err(|e| FetchError::new(FetchErrorKind::Parse(format!("manifest: {}", e))))?;

    let manifest = manifest.normalize();
    debug!(version = %manifest.version, entries = manifest.len(), "Fetched manifest");
    Ok(manifest)
}

//! Synchronizer settings.

use backdrop_error::ConfigError;
use std::time::Duration;
use url::Url;

/// Settings for one [`crate::Synchronizer`].
///
/// # Examples
///
/// ```
/// use backdrop_sync::SyncConfigBuilder;
///
/// let config = SyncConfigBuilder::default()
///     .manifest_url("https://assets.example.com/manifest.json")
///     .build()
///     .unwrap();
/// assert_eq!(*config.preview_concurrency(), 8);
/// assert_eq!(
///     config.asset_base().unwrap().as_str(),
///     "https://assets.example.com/manifest.json"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, derive_builder::Builder, derive_getters::Getters)]
#[builder(setter(into))]
pub struct SyncConfig {
    /// Remote manifest URL
    manifest_url: String,
    /// Base for relative asset paths; the manifest URL when unset
    #[builder(default, setter(into, strip_option))]
    asset_base_url: Option<String>,
    /// Hard limit on the manifest request
    #[builder(default = "Duration::from_millis(15_000)")]
    manifest_timeout: Duration,
    /// Download attempts per payload
    #[builder(default = "3")]
    max_attempts: u32,
    /// Delay after the first failed attempt; doubles each retry
    #[builder(default = "Duration::from_millis(300)")]
    base_delay: Duration,
    /// Workers for the preview phase
    #[builder(default = "8")]
    preview_concurrency: usize,
    /// Workers for the full-asset warm-up phase
    #[builder(default = "2")]
    full_concurrency: usize,
    /// Default workers for [`crate::Synchronizer::redownload_missing`]
    #[builder(default = "3")]
    repair_concurrency: usize,
}

impl SyncConfig {
    /// URL relative asset paths are resolved against.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured base (or manifest URL) does not parse.
    pub fn asset_base(&self) -> Result<Url, ConfigError> {
        let raw = self
            .asset_base_url
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(&self.manifest_url);
        Url::parse(raw).map_err(|e| ConfigError::new(format!("invalid asset base url {}: {}", raw, e)))
    }
}

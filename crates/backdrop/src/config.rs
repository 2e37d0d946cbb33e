//! Layered Backdrop configuration.
//!
//! Sources, later overriding earlier:
//! - Bundled defaults (include_str! from backdrop.toml)
//! - `~/.config/backdrop/backdrop.toml`
//! - `./backdrop.toml`
//! - `BACKDROP_*` environment variables

use backdrop_error::{BackdropError, BackdropResult, ConfigError};
use backdrop_sync::{SyncConfig, SyncConfigBuilder};
use config::builder::{ConfigBuilder, DefaultState};
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, instrument};

const DEFAULT_CONFIG: &str = include_str!("../backdrop.toml");

fn default_manifest_timeout_ms() -> u64 {
    15_000
}

fn default_max_attempts() -> u32 {
    3
}

fn default_base_delay_ms() -> u64 {
    300
}

fn default_preview_concurrency() -> usize {
    8
}

fn default_full_concurrency() -> usize {
    2
}

fn default_repair_concurrency() -> usize {
    3
}

/// Top-level Backdrop configuration.
///
/// # Example
///
/// ```no_run
/// use backdrop::BackdropConfig;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = BackdropConfig::load()?;
/// println!("Syncing from {}", config.manifest_url);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct BackdropConfig {
    /// Remote manifest URL
    pub manifest_url: String,

    /// Base for relative asset paths (the manifest URL when unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_base_url: Option<String>,

    /// Store root (the platform cache directory when unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_path: Option<PathBuf>,

    /// Manifest request timeout
    #[serde(default = "default_manifest_timeout_ms")]
    pub manifest_timeout_ms: u64,

    /// Download attempts per payload
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Backoff after the first failed attempt
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,

    /// Preview download workers
    #[serde(default = "default_preview_concurrency")]
    pub preview_concurrency: usize,

    /// Full-asset warm-up workers
    #[serde(default = "default_full_concurrency")]
    pub full_concurrency: usize,

    /// Default repair workers
    #[serde(default = "default_repair_concurrency")]
    pub repair_concurrency: usize,

    /// Log as JSON lines
    #[serde(default)]
    pub json_logs: bool,
}

impl BackdropConfig {
    /// Load configuration from one file only.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> BackdropResult<Self> {
        debug!("Loading configuration from file");

        Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()
            .map_err(|e| {
                BackdropError::from(ConfigError::new(format!(
                    "Failed to read configuration from {}: {}",
                    path.as_ref().display(),
                    e
                )))
            })?
            .try_deserialize()
            .map_err(|e| {
                BackdropError::from(ConfigError::new(format!(
                    "Failed to parse configuration: {}",
                    e
                )))
            })
    }

    /// Bundled defaults with a TOML overlay, ignoring user files and the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the overlay does not parse.
    pub fn from_toml_str(overlay: &str) -> BackdropResult<Self> {
        Self::deserialize_from(
            Config::builder()
                .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
                .add_source(File::from_str(overlay, FileFormat::Toml)),
        )
    }

    /// Load configuration with precedence: environment > current dir > home dir > bundled defaults.
    ///
    /// User config files are optional and silently skipped if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if any present source fails to parse.
    #[instrument]
    pub fn load() -> BackdropResult<Self> {
        debug!("Loading configuration with precedence: env > current dir > home dir > bundled defaults");

        let mut builder =
            Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("backdrop").join("backdrop.toml");
            builder = builder.add_source(File::from(user_config).required(false));
        }

        builder = builder
            .add_source(File::with_name("backdrop").required(false))
            .add_source(Environment::with_prefix("BACKDROP").try_parsing(true));

        Self::deserialize_from(builder)
    }

    fn deserialize_from(
        builder: ConfigBuilder<DefaultState>,
    ) -> BackdropResult<Self> {
        builder
            .build()
            .map_err(|e| {
                BackdropError::from(ConfigError::new(format!(
                    "Failed to build configuration: {}",
                    e
                )))
            })?
            .try_deserialize()
            .map_err(|e| {
                BackdropError::from(ConfigError::new(format!(
                    "Failed to parse configuration: {}",
                    e
                )))
            })
    }

    /// Resolved store root.
    pub fn store_root(&self) -> PathBuf {
        self.store_path.clone().unwrap_or_else(|| {
            dirs::cache_dir()
                .map(|dir| dir.join("backdrop"))
                .unwrap_or_else(|| PathBuf::from(".cache").join("backdrop"))
        })
    }

    /// Synchronizer settings derived from this configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the manifest URL is blank or a URL does not parse.
    pub fn sync_config(&self) -> BackdropResult<SyncConfig> {
        if self.manifest_url.trim().is_empty() {
            return Err(ConfigError::new("manifest_url is empty").into());
        }

        let mut builder = SyncConfigBuilder::default();
        builder
            .manifest_url(self.manifest_url.clone())
            .manifest_timeout(Duration::from_millis(self.manifest_timeout_ms))
            .max_attempts(self.max_attempts)
            .base_delay(Duration::from_millis(self.base_delay_ms))
            .preview_concurrency(self.preview_concurrency)
            .full_concurrency(self.full_concurrency)
            .repair_concurrency(self.repair_concurrency);
        if let Some(base) = &self.asset_base_url {
            builder.asset_base_url(base.clone());
        }

        let config = builder
            .build()
            .map_err(|e| ConfigError::new(format!("Invalid sync settings: {}", e)))?;
        config.asset_base()?;
        Ok(config)
    }
}

//! Backdrop - offline wallpaper asset cache.
//!
//! Backdrop keeps a local two-tier cache (previews and full payloads) in step
//! with a remotely published wallpaper manifest, and picks the wallpaper to
//! present from whatever is cached.
//!
//! # Features
//!
//! - **Manifest sync**: fetch, prune, download changed previews, warm one full asset per media type
//! - **Tiered store**: filesystem records verified by SHA-256 on read, with an in-memory fake for tests
//! - **Repair**: retry failed previews, fetch full payloads on demand
//! - **Rotation**: random, sequence or pinned selection over cached or user-supplied assets
//!
//! # Quick Start
//!
//! ```no_run
//! use backdrop::{Backdrop, BackdropConfig, SelectionState};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let backdrop = Backdrop::open(&BackdropConfig::load()?).await?;
//!     let report = backdrop.refresh().await?;
//!     println!("{}", report);
//!
//!     if let Some(entry) = backdrop.choose_entry(&SelectionState::default(), None).await {
//!         println!("Next wallpaper: {}", entry.display_name());
//!     }
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod service;
mod telemetry;

pub use config::BackdropConfig;
pub use service::{Backdrop, PayloadSource, Wallpaper};
pub use telemetry::init_telemetry;

pub use backdrop_core::{Manifest, ManifestEntry, MediaType};
pub use backdrop_error::{BackdropError, BackdropErrorKind, BackdropResult};
pub use backdrop_selection::{CollectionSource, SelectionMode, SelectionState};
pub use backdrop_store::{CacheKey, CacheRecord, Kind, RecordStatus};
pub use backdrop_sync::{DownloadOutcome, SyncHandle, SyncReport};

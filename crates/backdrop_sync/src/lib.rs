//! Manifest synchronization for Backdrop.
//!
//! A [`Synchronizer`] owns one injected [`backdrop_store::CacheStore`] and one
//! [`backdrop_fetch::Transport`]. Each pass:
//!
//! 1. fetches the remote manifest (a failure aborts the pass, leaving the store alone)
//! 2. snapshots the previously persisted manifest
//! 3. persists the new manifest
//! 4. prunes records of assets no longer listed
//! 5. downloads new or changed previews
//! 6. warms the full payload of the first image and the first video
//!
//! Phases run one after another, so at most one phase's workers are active.
//! The repair methods ([`Synchronizer::redownload_missing`],
//! [`Synchronizer::download_full_asset`]) reuse the same download path.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod handle;
mod repair;
mod report;
mod synchronizer;

pub use config::{SyncConfig, SyncConfigBuilder, SyncConfigBuilderError};
pub use handle::SyncHandle;
pub use report::{DownloadOutcome, SyncReport};
pub use synchronizer::Synchronizer;

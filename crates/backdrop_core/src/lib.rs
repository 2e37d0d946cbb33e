//! Core data types for the Backdrop asset cache.
//!
//! This crate provides the manifest model shared by the store, the synchronizer
//! and the selection policy.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod asset_url;
mod manifest;
mod media_type;

pub use asset_url::resolve_asset_url;
pub use manifest::{Manifest, ManifestEntry};
pub use media_type::MediaType;

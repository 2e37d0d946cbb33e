//! Wallpaper rotation policy for Backdrop.
//!
//! Given the manifest, the set of cached full payloads and the host's
//! [`SelectionState`], [`choose_entry`] decides which asset to present. The
//! policy is pure: it reads nothing and writes nothing.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod policy;
mod state;

pub use policy::{candidates, choose_entry, choose_entry_with_rng};
pub use state::{CollectionSource, SelectionMode, SelectionState};

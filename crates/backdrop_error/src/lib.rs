//! Error types for the Backdrop asset cache.
//!
//! This crate provides the foundation error types used throughout the Backdrop workspace.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All errors use `#[track_caller]` for automatic location capture
//!
//! # Examples
//!
//! ```
//! use backdrop_error::{BackdropResult, FetchError, FetchErrorKind};
//!
//! fn fetch_manifest() -> BackdropResult<String> {
//!     Err(FetchError::new(FetchErrorKind::HttpStatus {
//!         url: "https://example.com/wallpaper.json".to_string(),
//!         status: 503,
//!     }))?
//! }
//!
//! match fetch_manifest() {
//!     Ok(body) => println!("Got: {}", body),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod entry;
mod error;
mod fetch;
mod storage;
mod task;

pub use config::ConfigError;
pub use entry::{EntryError, EntryErrorKind};
pub use error::{BackdropError, BackdropErrorKind, BackdropResult};
pub use fetch::{FetchError, FetchErrorKind};
pub use storage::{StorageError, StorageErrorKind};
pub use task::{TaskError, TaskErrorKind};

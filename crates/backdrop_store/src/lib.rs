//! Durable two-tier blob store for Backdrop.
//!
//! Records are keyed by [`CacheKey`] (`{asset_id}::{kind}`) and routed by
//! [`Kind`] into a preview tier and a full tier. The store also persists the
//! last fetched manifest and a separate library of user-supplied wallpapers.
//!
//! # Backends
//!
//! - [`FileSystemBlobStore`] - durable, integrity-checked, schema-versioned
//! - [`MemoryBlobStore`] - volatile, for tests and ephemeral hosts
//!
//! # Example
//!
//! ```no_run
//! use backdrop_store::{BlobStore, CacheKey, CacheRecord, FileSystemBlobStore};
//!
//! # async fn example() -> backdrop_error::BackdropResult<()> {
//! let store = FileSystemBlobStore::open("/tmp/backdrop").await;
//! let key = CacheKey::preview("img-001");
//! store.put(&CacheRecord::stored(key.clone(), None, vec![1, 2, 3])).await?;
//! assert!(store.get(&key).await.is_some_and(|r| r.is_ok()));
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod filesystem;
mod fs_util;
mod key;
mod kind;
mod memory;
mod migration;
mod record;
mod store;
mod user_library;

pub use filesystem::FileSystemBlobStore;
pub use key::CacheKey;
pub use kind::Kind;
pub use memory::MemoryBlobStore;
pub use migration::{MigrationReport, SCHEMA_VERSION};
pub use record::{CacheRecord, RecordStatus};
pub use store::{BlobStore, CacheStore, ManifestStore};
pub use user_library::{UserAsset, UserAssetSummary, UserLibrary};

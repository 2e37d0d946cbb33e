//! Typed cache keys.

use crate::Kind;
use backdrop_error::{StorageError, StorageErrorKind};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Key of one cache record: `{asset_id}::{kind}`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CacheKey {
    asset_id: String,
    kind: Kind,
}

impl CacheKey {
    /// Key for an asset's payload of the given kind.
    pub fn new(asset_id: impl Into<String>, kind: Kind) -> Self {
        Self {
            asset_id: asset_id.into(),
            kind,
        }
    }

    /// Preview key for an asset.
    pub fn preview(asset_id: impl Into<String>) -> Self {
        Self::new(asset_id, Kind::Preview)
    }

    /// Full-resolution key for an asset.
    pub fn full(asset_id: impl Into<String>) -> Self {
        Self::new(asset_id, Kind::Full)
    }

    /// The asset id part of the key.
    pub fn asset_id(&self) -> &str {
        &self.asset_id
    }

    /// The payload kind of the key.
    pub fn kind(&self) -> Kind {
        self.kind
    }

    /// Key of the other payload of the same asset.
    pub fn paired(&self) -> Self {
        Self::new(self.asset_id.clone(), self.kind.paired())
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.asset_id, self.kind.suffix())
    }
}

impl FromStr for CacheKey {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        for kind in [Kind::Preview, Kind::Full] {
            if let Some(asset_id) = s.strip_suffix(kind.suffix()) {
                if asset_id.is_empty() {
                    break;
                }
                return Ok(Self::new(asset_id, kind));
            }
        }
        Err(StorageError::new(StorageErrorKind::InvalidKey(s.to_string())))
    }
}

impl TryFrom<String> for CacheKey {
    type Error = StorageError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CacheKey> for String {
    fn from(key: CacheKey) -> Self {
        key.to_string()
    }
}

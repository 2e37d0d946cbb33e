//! Payload kinds and tier routing.

use serde::{Deserialize, Serialize};

/// Which payload of an asset a record holds.
///
/// Each kind lives in its own tier: previews in the preview tier, full-resolution
/// payloads in the full tier.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    strum::EnumIter,
    derive_more::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    /// Small preview payload, fetched eagerly for every entry
    #[display("preview")]
    Preview,
    /// Full-resolution payload, fetched selectively
    #[display("full")]
    Full,
}

impl Kind {
    /// Key suffix for this kind, including the separator.
    pub fn suffix(&self) -> &'static str {
        match self {
            Kind::Preview => "::preview",
            Kind::Full => "::full",
        }
    }

    /// Directory name of the tier holding this kind.
    pub fn tier_dir(&self) -> &'static str {
        match self {
            Kind::Preview => "preview",
            Kind::Full => "full",
        }
    }

    /// The other kind of the same asset.
    pub fn paired(&self) -> Kind {
        match self {
            Kind::Preview => Kind::Full,
            Kind::Full => Kind::Preview,
        }
    }

    /// Tier a raw key routes to.
    ///
    /// Keys ending in the preview suffix go to the preview tier; everything else,
    /// including keys with no recognizable suffix, goes to the full tier.
    ///
    /// # Examples
    ///
    /// ```
    /// use backdrop_store::Kind;
    ///
    /// assert_eq!(Kind::tier_for("img-001::preview"), Kind::Preview);
    /// assert_eq!(Kind::tier_for("img-001::full"), Kind::Full);
    /// assert_eq!(Kind::tier_for("img-001::poster"), Kind::Full);
    /// ```
    pub fn tier_for(raw_key: &str) -> Kind {
        if raw_key.ends_with(Kind::Preview.suffix()) {
            Kind::Preview
        } else {
            Kind::Full
        }
    }
}

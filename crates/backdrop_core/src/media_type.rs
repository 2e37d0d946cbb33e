//! Media type enumeration.

use serde::{Deserialize, Serialize};

/// Type of wallpaper asset.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    strum::EnumIter,
    strum::EnumString,
    derive_more::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(ascii_case_insensitive)]
pub enum MediaType {
    /// Still image (JPEG, PNG, WebP)
    #[default]
    #[display("image")]
    #[strum(serialize = "image", serialize = "img")]
    Image,
    /// Looping video (MP4, WebM)
    #[display("video")]
    #[strum(serialize = "video", serialize = "vdo")]
    Video,
}

impl MediaType {
    /// Convert to string representation for storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Image => "image",
            MediaType::Video => "video",
        }
    }
}

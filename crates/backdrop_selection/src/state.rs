//! Rotation settings supplied by the host.

use backdrop_core::MediaType;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// How the next wallpaper is picked.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::EnumIter,
    strum::EnumString,
    derive_more::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(ascii_case_insensitive)]
pub enum SelectionMode {
    /// Uniform pick among candidates
    #[default]
    #[display("random")]
    #[strum(serialize = "random")]
    Random,
    /// The candidate after the last one shown, wrapping around
    #[display("sequence")]
    #[strum(serialize = "sequence")]
    Sequence,
    /// The pinned asset, if it is available
    #[display("specific")]
    #[strum(serialize = "specific")]
    Specific,
}

/// Which collection candidates come from.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::EnumIter,
    strum::EnumString,
    derive_more::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(ascii_case_insensitive)]
pub enum CollectionSource {
    /// Assets published in the manifest
    #[default]
    #[display("predefined")]
    #[strum(serialize = "predefined")]
    Predefined,
    /// Wallpapers the user added
    #[display("user")]
    #[strum(serialize = "user")]
    User,
}

/// Rotation state for one selection call. Not persisted here.
///
/// # Examples
///
/// ```
/// use backdrop_core::MediaType;
/// use backdrop_selection::{SelectionMode, SelectionState};
///
/// let state = SelectionState::default()
///     .with_mode(SelectionMode::Sequence)
///     .with_media_type(MediaType::Video)
///     .with_last_selected_id("vid-003");
/// assert_eq!(state.last_selected_id().as_deref(), Some("vid-003"));
/// ```
#[derive(
    Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Getters, derive_setters::Setters,
)]
#[setters(prefix = "with_")]
#[serde(default)]
pub struct SelectionState {
    /// Rotation mode
    mode: SelectionMode,
    /// Candidate collection
    collection_source: CollectionSource,
    /// Media type to pick from
    media_type: MediaType,
    /// Asset shown last, for sequence mode
    #[setters(strip_option, into)]
    last_selected_id: Option<String>,
    /// Asset to show in specific mode
    #[setters(strip_option, into)]
    pinned_id: Option<String>,
}

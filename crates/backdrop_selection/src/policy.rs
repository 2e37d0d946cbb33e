//! Choosing the wallpaper to present.

use crate::{CollectionSource, SelectionMode, SelectionState};
use backdrop_core::{Manifest, ManifestEntry};
use backdrop_store::CacheKey;
use rand::Rng;
use rand::seq::SliceRandom;
use std::collections::BTreeSet;
use tracing::debug;

/// Candidates for one selection and the mode to apply to them.
///
/// User collections use the user assets of the requested media type. When
/// there are none, or the source is predefined, candidates are the manifest
/// entries of that media type whose full payload is cached. Falling back from
/// an empty user collection downgrades `specific` to `random`, since a pin
/// refers to a user asset.
pub fn candidates<'a>(
    manifest: &'a Manifest,
    state: &SelectionState,
    full_keys: &BTreeSet<CacheKey>,
    user_assets: &'a [ManifestEntry],
) -> (Vec<&'a ManifestEntry>, SelectionMode) {
    let media_type = *state.media_type();
    let mut mode = *state.mode();

    if *state.collection_source() == CollectionSource::User {
        let user: Vec<&ManifestEntry> = user_assets
            .iter()
            .filter(|entry| entry.media_type == media_type)
            .collect();
        if !user.is_empty() {
            return (user, mode);
        }
        debug!(%media_type, "No user assets, falling back to predefined collection");
        if mode == SelectionMode::Specific {
            mode = SelectionMode::Random;
        }
    }

    let predefined = manifest
        .entries_of(media_type)
        .iter()
        .filter(|entry| full_keys.contains(&CacheKey::full(entry.id.as_str())))
        .collect();
    (predefined, mode)
}

/// Pick the entry to present, using the thread-local RNG for random picks.
///
/// Returns `None` only when no candidate is available. See
/// [`choose_entry_with_rng`].
pub fn choose_entry<'a>(
    manifest: &'a Manifest,
    state: &SelectionState,
    exclude_id: Option<&str>,
    full_keys: &BTreeSet<CacheKey>,
    user_assets: &'a [ManifestEntry],
) -> Option<&'a ManifestEntry> {
    choose_entry_with_rng(
        manifest,
        state,
        exclude_id,
        full_keys,
        user_assets,
        &mut rand::thread_rng(),
    )
}

/// Pick the entry to present.
///
/// `exclude_id` removes one candidate, typically one whose payload just
/// failed to load, unless it is the only candidate. Then:
///
/// - `specific` returns the pinned entry if it is a candidate, else acts as `random`
/// - `sequence` returns the candidate after `last_selected_id`, wrapping to the first
/// - `random` picks uniformly
///
/// # Examples
///
/// ```
/// use backdrop_core::{Manifest, ManifestEntry, MediaType};
/// use backdrop_selection::{SelectionMode, SelectionState, choose_entry_with_rng};
/// use backdrop_store::CacheKey;
/// use rand::SeedableRng;
/// use std::collections::BTreeSet;
///
/// let entry = |id: &str| ManifestEntry::new(id, "1", "p", "f", MediaType::Image);
/// let manifest = Manifest {
///     version: "1".into(),
///     images: vec![entry("a"), entry("b"), entry("c")],
///     videos: vec![],
/// };
/// let cached: BTreeSet<_> = ["a", "b", "c"].into_iter().map(CacheKey::full).collect();
/// let state = SelectionState::default()
///     .with_mode(SelectionMode::Sequence)
///     .with_last_selected_id("c");
///
/// let mut rng = rand::rngs::StdRng::seed_from_u64(7);
/// let next = choose_entry_with_rng(&manifest, &state, None, &cached, &[], &mut rng);
/// assert_eq!(next.map(|e| e.id.as_str()), Some("a"));
/// ```
pub fn choose_entry_with_rng<'a, R>(
    manifest: &'a Manifest,
    state: &SelectionState,
    exclude_id: Option<&str>,
    full_keys: &BTreeSet<CacheKey>,
    user_assets: &'a [ManifestEntry],
    rng: &mut R,
) -> Option<&'a ManifestEntry>
where
    R: Rng + ?Sized,
{
    let (mut pool, mode) = candidates(manifest, state, full_keys, user_assets);

    if let Some(excluded) = exclude_id {
        let remaining: Vec<&ManifestEntry> = pool
            .iter()
            .copied()
            .filter(|entry| entry.id != excluded)
            .collect();
        if !remaining.is_empty() {
            pool = remaining;
        }
    }

    if pool.is_empty() {
        debug!(media_type = %state.media_type(), "No candidate available");
        return None;
    }

    let chosen = match mode {
        SelectionMode::Specific => {
            let pinned = state
                .pinned_id()
                .as_deref()
                .and_then(|id| pool.iter().copied().find(|entry| entry.id == id));
            match pinned {
                Some(entry) => Some(entry),
                None => pool.choose(rng).copied(),
            }
        }
        SelectionMode::Sequence => {
            let next = state
                .last_selected_id()
                .as_deref()
                .and_then(|last| pool.iter().position(|entry| entry.id == last))
                .map_or(0, |index| (index + 1) % pool.len());
            pool.get(next).copied()
        }
        SelectionMode::Random => pool.choose(rng).copied(),
    };

    if let Some(entry) = chosen {
        debug!(id = %entry.id, %mode, candidates = pool.len(), "Chose entry");
    }
    chosen
}

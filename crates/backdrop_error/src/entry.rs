//! Manifest entry validation errors.

/// Ways a manifest entry can be unusable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum EntryErrorKind {
    /// Entry has no id
    #[display("entry is missing an id")]
    MissingId,
    /// Entry has no URL for the requested payload kind
    #[display("entry {} is missing a {} url", id, kind)]
    MissingUrl {
        /// Asset id of the offending entry
        id: String,
        /// Payload kind whose URL is missing ("preview" or "full")
        kind: String,
    },
    /// URL could not be resolved against the asset base
    #[display("entry {} has an unresolvable url: {}", id, url)]
    UnresolvableUrl {
        /// Asset id of the offending entry
        id: String,
        /// The raw URL or path from the manifest
        url: String,
    },
}

/// Invalid manifest entry error with location tracking.
///
/// # Examples
///
/// ```
/// use backdrop_error::{EntryError, EntryErrorKind};
///
/// let err = EntryError::new(EntryErrorKind::MissingId);
/// assert!(format!("{}", err).contains("missing an id"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Invalid Entry: {} at line {} in {}", kind, line, file)]
pub struct EntryError {
    /// The kind of error that occurred
    pub kind: EntryErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl EntryError {
    /// Create a new entry error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: EntryErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}

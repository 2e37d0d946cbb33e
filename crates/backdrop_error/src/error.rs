//! Top-level error wrapper types.

use crate::{ConfigError, EntryError, FetchError, StorageError, TaskError};

/// The foundation error enum.
///
/// # Examples
///
/// ```
/// use backdrop_error::{BackdropError, StorageError, StorageErrorKind};
///
/// let storage_err = StorageError::new(StorageErrorKind::Unavailable("disk full".to_string()));
/// let err: BackdropError = storage_err.into();
/// assert!(format!("{}", err).contains("Storage Error"));
/// ```
#[derive(Debug, Clone, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum BackdropErrorKind {
    /// Network fetch error
    #[from(FetchError)]
    Fetch(FetchError),
    /// Blob store error
    #[from(StorageError)]
    Storage(StorageError),
    /// Invalid manifest entry
    #[from(EntryError)]
    Entry(EntryError),
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// Worker or background task error
    #[from(TaskError)]
    Task(TaskError),
}

/// Backdrop error with kind discrimination.
///
/// # Examples
///
/// ```
/// use backdrop_error::{BackdropResult, ConfigError};
///
/// fn might_fail() -> BackdropResult<()> {
///     Err(ConfigError::new("Missing field"))?
/// }
///
/// match might_fail() {
///     Ok(_) => println!("Success"),
///     Err(e) => println!("Error: {}", e),
/// }
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Backdrop Error: {}", _0)]
pub struct BackdropError(Box<BackdropErrorKind>);

impl BackdropError {
    /// Create a new error from a kind.
    pub fn new(kind: BackdropErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &BackdropErrorKind {
        &self.0
    }

    /// Whether this error came from the network rather than local storage.
    pub fn is_network(&self) -> bool {
        matches!(self.kind(), BackdropErrorKind::Fetch(_))
    }

    /// Whether this error means local storage could not be used.
    pub fn is_storage(&self) -> bool {
        matches!(self.kind(), BackdropErrorKind::Storage(_))
    }
}

// Generic From implementation for any type that converts to BackdropErrorKind
impl<T> From<T> for BackdropError
where
    T: Into<BackdropErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for Backdrop operations.
pub type BackdropResult<T> = std::result::Result<T, BackdropError>;

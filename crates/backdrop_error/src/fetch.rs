//! Network fetch error types.

/// Kinds of network fetch errors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum FetchErrorKind {
    /// No response arrived within the timeout
    #[display("Request to {} timed out after {}ms", url, timeout_ms)]
    Timeout {
        /// Requested URL
        url: String,
        /// Timeout that elapsed
        timeout_ms: u64,
    },
    /// Server answered with a non-2xx status
    #[display("Request to {} failed with HTTP {}", url, status)]
    HttpStatus {
        /// Requested URL
        url: String,
        /// HTTP status code
        status: u16,
    },
    /// Response body could not be parsed
    #[display("Failed to parse response: {}", _0)]
    Parse(String),
    /// Transport-level failure (connection refused, DNS, TLS, body read)
    #[display("Transport failure: {}", _0)]
    Transport(String),
    /// Binary download ran out of attempts
    #[display("Download of {} failed after {} attempts: {}", url, attempts, last)]
    DownloadExhausted {
        /// Requested URL
        url: String,
        /// Number of attempts performed
        attempts: u32,
        /// Message of the last attempt's error
        last: String,
    },
}

/// Fetch error with location tracking.
///
/// # Examples
///
/// ```
/// use backdrop_error::{FetchError, FetchErrorKind};
///
/// let err = FetchError::new(FetchErrorKind::HttpStatus {
///     url: "https://example.com/a.jpg".to_string(),
///     status: 404,
/// });
/// assert!(format!("{}", err).contains("HTTP 404"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Fetch Error: {} at line {} in {}", kind, line, file)]
pub struct FetchError {
    /// The kind of error that occurred
    pub kind: FetchErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl FetchError {
    /// Create a new fetch error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: FetchErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}

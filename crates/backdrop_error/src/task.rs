//! Worker task errors.

/// Kinds of worker task failure.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum TaskErrorKind {
    /// Worker panicked while processing an item
    #[display("worker panicked on item {}: {}", index, message)]
    Panicked {
        /// Index of the item being processed
        index: usize,
        /// Panic payload, if it was a string
        message: String,
    },
    /// Background task could not be joined
    #[display("background task failed to join: {}", _0)]
    Join(String),
}

/// Worker task error with location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Task Error: {} at line {} in {}", kind, line, file)]
pub struct TaskError {
    /// The kind of error that occurred
    pub kind: TaskErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl TaskError {
    /// Create a new task error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: TaskErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}

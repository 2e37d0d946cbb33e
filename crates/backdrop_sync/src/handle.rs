//! Handle to a background sync pass.

use crate::SyncReport;
use backdrop_error::{BackdropResult, TaskError, TaskErrorKind};
use tokio::task::JoinHandle;

/// A sync pass running on the tokio runtime.
///
/// Dropping the handle detaches the pass; it keeps running. Hosts that want a
/// clean shutdown await [`SyncHandle::join`].
#[derive(Debug)]
pub struct SyncHandle {
    inner: JoinHandle<BackdropResult<SyncReport>>,
}

impl SyncHandle {
    pub(crate) fn new(inner: JoinHandle<BackdropResult<SyncReport>>) -> Self {
        Self { inner }
    }

    /// Whether the pass has finished.
    pub fn is_finished(&self) -> bool {
        self.inner.is_finished()
    }

    /// Stop the pass at its next suspension point.
    pub fn abort(&self) {
        self.inner.abort();
    }

    /// Wait for the pass and return its report.
    ///
    /// # Errors
    ///
    /// Returns the pass's own error, or a task error if it panicked or was
    /// aborted.
    pub async fn join(self) -> BackdropResult<SyncReport> {
        match self.inner.await {
            Ok(result) => result,
            Err(e) => Err(TaskError::new(TaskErrorKind::Join(e.to_string())).into()),
        }
    }
}

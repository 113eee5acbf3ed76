//! Cancellable background searches.
//!
//! A search started with [`spawn_search`] runs on the tokio runtime instead
//! of the caller's task. The returned [`SearchHandle`] can cancel it; once
//! cancelled, the in-flight request future is dropped (closing its
//! connection) and the handle never yields a result. Dropping the handle
//! cancels the search as well.

use std::future::Future;

use tokio::task::{AbortHandle, JoinHandle};

use crate::ClientError;

/// A search running on the tokio runtime.
#[derive(Debug)]
pub struct SearchHandle<R> {
    handle: JoinHandle<Result<R, ClientError>>,
    cancelled: bool,
}

/// Runs `search` on the current tokio runtime.
///
/// # Panics
///
/// Panics if called outside a tokio runtime.
pub fn spawn_search<R, F>(search: F) -> SearchHandle<R>
where
    F: Future<Output = Result<R, ClientError>> + Send + 'static,
    R: Send + 'static,
{
    SearchHandle {
        handle: tokio::spawn(search),
        cancelled: false,
    }
}

impl<R> SearchHandle<R> {
    /// Cancels the search. Safe to call more than once or after the search
    /// finished.
    pub fn cancel(&mut self) {
        self.cancelled = true;
        self.handle.abort();
    }

    /// Returns a handle that cancels the search without consuming `self`,
    /// for racing [`Self::join`] against another event.
    #[must_use]
    pub fn abort_handle(&self) -> AbortHandle {
        self.handle.abort_handle()
    }

    /// Returns `true` once the search has finished or been cancelled.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Waits for the search.
    ///
    /// Returns `None` if the search was cancelled, even when the request had
    /// already completed. The background task is always awaited, so any
    /// resources it held are released before this returns.
    ///
    /// # Panics
    ///
    /// Re-raises a panic from inside the search.
    pub async fn join(mut self) -> Option<Result<R, ClientError>> {
        match (&mut self.handle).await {
            Ok(_) if self.cancelled => None,
            Ok(result) => Some(result),
            Err(e) if e.is_cancelled() => None,
            Err(e) => std::panic::resume_unwind(e.into_panic()),
        }
    }
}

impl<R> Drop for SearchHandle<R> {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::domain::errors::StoreError;

/// Caller-supplied bound on store calls.
///
/// Combines an absolute deadline with a cancellation signal. A store call
/// raced through [`Deadline::run`] is dropped as soon as either fires and
/// reports a [`StoreError`], which callers surface as a dependency failure
/// rather than an invalid credential.
#[derive(Debug, Clone)]
pub struct Deadline {
    expires_at: Instant,
    cancellation: CancellationToken,
}

impl Deadline {
    /// Deadline `timeout` from now with a fresh, never-cancelled signal.
    pub fn after(timeout: Duration) -> Self {
        Self {
            expires_at: Instant::now() + timeout,
            cancellation: CancellationToken::new(),
        }
    }

    /// Attach a cancellation signal (e.g. a child of the shutdown token).
    pub fn with_cancellation(mut self, cancellation: CancellationToken) -> Self {
        self.cancellation = cancellation;
        self
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    /// Run `future`, aborting it on cancellation or deadline expiry.
    ///
    /// Cancellation is checked first, then the deadline, so an already
    /// expired deadline never starts the operation.
    ///
    /// # Errors
    /// * `Cancelled` - The signal fired before the operation finished
    /// * `DeadlineExceeded` - The deadline passed before the operation finished
    /// * Whatever the operation itself returns
    pub async fn run<T, E, F>(&self, operation: &'static str, future: F) -> Result<T, E>
    where
        F: Future<Output = Result<T, E>>,
        E: From<StoreError>,
    {
        tokio::select! {
            biased;
            _ = self.cancellation.cancelled() => Err(StoreError::Cancelled(operation).into()),
            _ = tokio::time::sleep_until(self.expires_at) => {
                Err(StoreError::DeadlineExceeded(operation).into())
            }
            result = future => result,
        }
    }
}

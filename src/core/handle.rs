//! # Handle to a supervised reader.
//!
//! Returned by every supervise call. Dropping it detaches: the reader keeps
//! running and respawning. Keeping it allows advisory cancellation and
//! waiting for the pipeline to stop.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::{JoinError, JoinHandle};
use tokio_util::sync::CancellationToken;

use crate::error::RuntimeError;

/// Control handle for one supervised reader.
#[derive(Debug)]
pub struct ReaderHandle {
    name: Arc<str>,
    token: CancellationToken,
    join: JoinHandle<()>,
    grace: Duration,
}

impl ReaderHandle {
    pub(crate) fn new(
        name: Arc<str>,
        token: CancellationToken,
        join: JoinHandle<()>,
        grace: Duration,
    ) -> Self {
        Self {
            name,
            token,
            join,
            grace,
        }
    }

    /// Name of the supervised reader.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Requests the reader to stop.
    ///
    /// Advisory only: a drain loop finishes every item still queued, then
    /// returns normally, which also ends supervision.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Returns `true` once [`cancel`](Self::cancel) (or a parent cancellation) happened.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Returns `true` when supervision has ended.
    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Waits until supervision ends (the reader returned normally).
    pub async fn join(self) -> Result<(), JoinError> {
        self.join.await
    }

    /// Cancels the reader and waits up to the configured grace period.
    pub async fn shutdown(self) -> Result<(), RuntimeError> {
        let grace = self.grace;
        self.shutdown_within(grace).await
    }

    /// Cancels the reader and waits up to `grace` for it to stop.
    ///
    /// On timeout the reader is left running and
    /// [`RuntimeError::GraceExceeded`] is returned.
    pub async fn shutdown_within(mut self, grace: Duration) -> Result<(), RuntimeError> {
        self.token.cancel();
        match tokio::time::timeout(grace, &mut self.join).await {
            Ok(_) => Ok(()),
            Err(_) => Err(RuntimeError::GraceExceeded {
                grace,
                reader: self.name.to_string(),
            }),
        }
    }
}

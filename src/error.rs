//! Error types used by the batchvisor runtime, its queues and its readers.
//!
//! This module defines three error types:
//!
//! - [`TaskError`] - raised by a single reader execution (per-item failures, panics).
//! - [`PutError`] - returned by a bounded queue when an item could not be enqueued.
//! - [`RuntimeError`] - raised by the supervision runtime itself.
//!
//! The enums provide `as_label` for logging and [`TaskError::fail`] to wrap arbitrary errors.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// # Errors produced by a reader execution.
///
/// Any of these reaching the supervisor (other than a normal `Ok(())`)
/// counts as an uncaught failure and triggers a respawn.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum TaskError {
    /// The per-item action (or the reader itself) reported a failure.
    #[error("execution failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// The reader panicked; the panic payload is rendered into `info`.
    #[error("panicked: {info}")]
    Panicked {
        /// Panic message, or `"unknown panic"` for non-string payloads.
        info: String,
    },

    /// The execution gave up because its context was cancelled.
    ///
    /// For custom [`Task`](crate::Task) readers that cannot drain-then-stop.
    /// The supervisor treats it as a clean stop when the reader's token is
    /// cancelled, and as an ordinary failure otherwise.
    #[error("context cancelled")]
    Canceled,
}

impl TaskError {
    /// Wraps any displayable error as [`TaskError::Fail`].
    ///
    /// # Example
    /// ```
    /// use batchvisor::TaskError;
    ///
    /// let err = TaskError::fail("disk full");
    /// assert_eq!(err.to_string(), "execution failed: disk full");
    /// ```
    pub fn fail(error: impl fmt::Display) -> Self {
        TaskError::Fail {
            error: error.to_string(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            TaskError::Fail { .. } => "task_failed",
            TaskError::Panicked { .. } => "task_panicked",
            TaskError::Canceled => "task_canceled",
        }
    }
}

impl From<anyhow::Error> for TaskError {
    fn from(err: anyhow::Error) -> Self {
        TaskError::Fail {
            error: format!("{err:#}"),
        }
    }
}

/// # Errors returned by a queue put.
///
/// The rejected item is always handed back to the caller.
#[non_exhaustive]
#[derive(Error)]
pub enum PutError<T> {
    /// No capacity became available before the timeout elapsed.
    #[error("queue full: put timed out")]
    Timeout(T),
}

impl<T> PutError<T> {
    /// Returns the item that could not be enqueued.
    pub fn into_inner(self) -> T {
        match self {
            PutError::Timeout(item) => item,
        }
    }

    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            PutError::Timeout(_) => "queue_put_timeout",
        }
    }
}

// Manual impl: items are not required to be `Debug`.
impl<T> fmt::Debug for PutError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PutError::Timeout(_) => f.write_str("Timeout(..)"),
        }
    }
}

/// # Errors produced by the supervision runtime.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// The reader did not stop within the grace period after being cancelled.
    #[error("shutdown timeout {grace:?} exceeded; reader {reader:?} still running")]
    GraceExceeded {
        /// The configured grace duration.
        grace: Duration,
        /// Name of the reader that did not stop in time.
        reader: String,
    },
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use batchvisor::RuntimeError;
    /// use std::time::Duration;
    ///
    /// let err = RuntimeError::GraceExceeded { grace: Duration::from_secs(5), reader: "r".into() };
    /// assert_eq!(err.as_label(), "runtime_grace_exceeded");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::GraceExceeded { .. } => "runtime_grace_exceeded",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_error_labels() {
        assert_eq!(TaskError::fail("x").as_label(), "task_failed");
        assert_eq!(
            TaskError::Panicked { info: "boom".into() }.as_label(),
            "task_panicked"
        );
        assert_eq!(TaskError::Canceled.as_label(), "task_canceled");
    }

    #[test]
    fn test_anyhow_conversion_keeps_context() {
        let err = anyhow::anyhow!("socket reset").context("writing record");
        let task_err = TaskError::from(err);
        assert_eq!(
            task_err.to_string(),
            "execution failed: writing record: socket reset"
        );
    }

    #[test]
    fn test_put_error_returns_item() {
        let err = PutError::Timeout(7u32);
        assert_eq!(err.as_label(), "queue_put_timeout");
        assert_eq!(err.into_inner(), 7);

        let err = PutError::Timeout("x");
        assert_eq!(format!("{err:?}"), "Timeout(..)");
        assert_eq!(err.to_string(), "queue full: put timed out");
    }
}

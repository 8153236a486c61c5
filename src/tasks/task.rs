//! # Reader abstraction.
//!
//! A reader is anything the supervisor can run again and again: the
//! [`Task`] trait (async, cancelable) and its shared handle [`TaskRef`].
//!
//! A task receives a [`CancellationToken`]; cancellation is advisory, the task
//! decides when to honor it (a drain loop empties its queue first).

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::TaskError;

/// # Shared handle to a task object.
///
/// This is what [`supervise`](crate::supervise) holds on to for respawning.
pub type TaskRef = Arc<dyn Task>;

/// # Asynchronous, cancelable, re-runnable unit.
///
/// Every call to [`run`](Task::run) is an independent execution; state that
/// must survive a respawn belongs outside the task (e.g. in the queue).
///
/// # Example
/// ```
/// use tokio_util::sync::CancellationToken;
/// use async_trait::async_trait;
/// use batchvisor::{Task, TaskError};
///
/// struct Demo;
///
/// #[async_trait]
/// impl Task for Demo {
///     fn name(&self) -> &str { "demo" }
///
///     async fn run(&self, ctx: CancellationToken) -> Result<(), TaskError> {
///         if ctx.is_cancelled() {
///             return Ok(());
///         }
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Task: Send + Sync + 'static {
    /// Returns a stable, human-readable name used in logs and events.
    fn name(&self) -> &str;

    /// Runs one execution until it returns or fails.
    ///
    /// `Ok(())` means a clean stop; any `Err` (or a panic) is an uncaught
    /// failure from the supervisor's point of view.
    async fn run(&self, ctx: CancellationToken) -> Result<(), TaskError>;
}

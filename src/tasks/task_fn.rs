//! # Function-backed task (`TaskFn`)
//!
//! [`TaskFn`] wraps a closure `F: Fn(CancellationToken) -> Fut`, producing a
//! fresh future per execution. Nothing is shared between executions unless
//! the closure captures it explicitly (e.g. an `Arc<...>`).
//!
//! ## Example
//! ```rust
//! use tokio_util::sync::CancellationToken;
//! use batchvisor::{TaskFn, TaskRef, TaskError};
//!
//! let t: TaskRef = TaskFn::arc("reader", |ctx: CancellationToken| async move {
//!     if ctx.is_cancelled() {
//!         return Ok(());
//!     }
//!     Ok::<_, TaskError>(())
//! });
//!
//! assert_eq!(t.name(), "reader");
//! ```

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::TaskError;
use crate::tasks::task::{Task, TaskRef};

/// Function-backed task implementation.
#[derive(Debug)]
pub struct TaskFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> TaskFn<F> {
    /// Creates a new function-backed task.
    ///
    /// Prefer [`TaskFn::arc`] when you immediately need a [`TaskRef`].
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }
}

impl<F, Fut> TaskFn<F>
where
    F: Fn(CancellationToken) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), TaskError>> + Send + 'static,
{
    /// Creates the task and returns it as a shared handle (`Arc<dyn Task>`).
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> TaskRef {
        Arc::new(Self::new(name, f))
    }
}

#[async_trait]
impl<F, Fut> Task for TaskFn<F>
where
    F: Fn(CancellationToken) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), TaskError>> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, ctx: CancellationToken) -> Result<(), TaskError> {
        (self.f)(ctx).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_each_run_creates_fresh_future() {
        let calls = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&calls);
        let task = TaskFn::arc("counter", move |_ctx: CancellationToken| {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Ok::<(), TaskError>(())
            }
        });

        let ctx = CancellationToken::new();
        task.run(ctx.clone()).await.unwrap();
        task.run(ctx).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(task.name(), "counter");
    }

    #[tokio::test]
    async fn test_error_is_returned() {
        let task = TaskFn::arc("bad", |_ctx: CancellationToken| async {
            Err::<(), _>(TaskError::fail("nope"))
        });
        let err = task.run(CancellationToken::new()).await.unwrap_err();
        assert_eq!(err.as_label(), "task_failed");
    }
}

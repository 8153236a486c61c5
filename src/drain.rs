//! # Micro-batch drain loop.
//!
//! [`MicroBatchDrainer`] is the consumer side of a pipeline: it pulls bounded
//! batches out of a [`Queue`], hands every item to a per-item action, and
//! falls back to a timed single-item wait plus heartbeat when the queue is idle.
//!
//! ## Loop
//! ```text
//! while !(queue.is_empty() && ctx.is_cancelled()) {
//!   ├─► drain_to(batch, max_batch - 1)        (non-blocking)
//!   ├─► on_item(item) for each item, in order (first Err/panic ends the run;
//!   │                                          the rest of the batch is lost)
//!   ├─► batch.clear()
//!   └─► if batch was empty:
//!         timed_take(idle_timeout)
//!           ├─ Some(item) → carried into the next batch (not processed yet)
//!           └─ None       → on_heartbeat()
//! }
//! ```
//!
//! ## Rules
//! - A batch never holds more than `max_batch` items (default 100).
//! - Cancellation is advisory and checked once per iteration: a cancelled
//!   loop keeps draining until it observes an empty queue.
//! - Failures are not caught here; they end the execution and are left to
//!   the supervisor. Items still in the queue are untouched.

use std::borrow::Cow;
use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::{
    config::DrainConfig,
    error::TaskError,
    events::{Bus, Event, EventKind},
    queue::{Queue, timed_take},
    tasks::{Task, TaskRef},
};

/// Heartbeat used by [`micro_batch_drainer`].
pub type NoHeartbeat = fn();

fn no_heartbeat() {}

/// Builds a drain loop over `queue` with no heartbeat action.
///
/// # Example
/// ```
/// use batchvisor::{BoundedQueue, TaskError, micro_batch_drainer};
///
/// let queue = BoundedQueue::<String>::new(1024);
/// let reader = micro_batch_drainer(queue.clone(), |line: String| {
///     println!("{line}");
///     Ok::<_, TaskError>(())
/// })
/// .named("stdout-writer")
/// .arc();
/// assert_eq!(reader.name(), "stdout-writer");
/// ```
pub fn micro_batch_drainer<T, Q, F>(queue: Q, on_item: F) -> MicroBatchDrainer<T, Q, F, NoHeartbeat>
where
    T: Send + 'static,
    Q: Queue<T>,
    F: Fn(T) -> Result<(), TaskError> + Send + Sync + 'static,
{
    micro_batch_drainer_with_heartbeat(queue, on_item, no_heartbeat as NoHeartbeat)
}

/// Builds a drain loop over `queue` that calls `on_heartbeat` once per idle timeout.
pub fn micro_batch_drainer_with_heartbeat<T, Q, F, H>(
    queue: Q,
    on_item: F,
    on_heartbeat: H,
) -> MicroBatchDrainer<T, Q, F, H>
where
    T: Send + 'static,
    Q: Queue<T>,
    F: Fn(T) -> Result<(), TaskError> + Send + Sync + 'static,
    H: Fn() + Send + Sync + 'static,
{
    MicroBatchDrainer {
        name: Cow::Borrowed("queue-reader"),
        queue,
        on_item,
        on_heartbeat,
        cfg: DrainConfig::default(),
        bus: None,
        _item: PhantomData,
    }
}

/// Re-runnable micro-batching queue consumer.
///
/// Every [`Task::run`] is an independent execution with its own batch; the
/// queue is the only state shared between executions.
pub struct MicroBatchDrainer<T, Q, F, H> {
    name: Cow<'static, str>,
    queue: Q,
    on_item: F,
    on_heartbeat: H,
    cfg: DrainConfig,
    bus: Option<Bus>,
    _item: PhantomData<fn() -> T>,
}

impl<T, Q, F, H> MicroBatchDrainer<T, Q, F, H>
where
    T: Send + 'static,
    Q: Queue<T>,
    F: Fn(T) -> Result<(), TaskError> + Send + Sync + 'static,
    H: Fn() + Send + Sync + 'static,
{
    /// Sets the reader name used in logs and events (default `"queue-reader"`).
    pub fn named(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.name = name.into();
        self
    }

    /// Overrides batch bound and idle timeout.
    pub fn with_config(mut self, cfg: DrainConfig) -> Self {
        self.cfg = cfg;
        self
    }

    /// Publishes `BatchProcessed` / `Heartbeat` events to `bus`.
    pub fn with_bus(mut self, bus: Bus) -> Self {
        self.bus = Some(bus);
        self
    }

    /// Wraps the drainer into a shared [`TaskRef`] for supervision.
    pub fn arc(self) -> TaskRef {
        Arc::new(self)
    }

    /// Hands every item of `batch` to the per-item action, emptying it.
    ///
    /// On the first failure the untouched remainder is dropped.
    fn process(&self, batch: &mut Vec<T>) -> Result<(), TaskError> {
        let size = batch.len();
        for (idx, item) in batch.drain(..).enumerate() {
            if let Err(e) = (self.on_item)(item) {
                debug!(
                    reader = %self.name,
                    batch_size = size,
                    lost = size - idx - 1,
                    error = %e,
                    "per-item action failed; abandoning rest of batch"
                );
                return Err(e);
            }
        }
        if size > 0 {
            trace!(reader = %self.name, batch_size = size, "batch processed");
            self.publish(
                Event::new(EventKind::BatchProcessed)
                    .with_reader(self.name.as_ref())
                    .with_batch_size(size),
            );
        }
        Ok(())
    }

    fn heartbeat(&self) {
        trace!(reader = %self.name, "queue idle; heartbeat");
        (self.on_heartbeat)();
        self.publish(Event::new(EventKind::Heartbeat).with_reader(self.name.as_ref()));
    }

    fn publish(&self, ev: Event) {
        if let Some(bus) = &self.bus {
            bus.publish(ev);
        }
    }
}

#[async_trait]
impl<T, Q, F, H> Task for MicroBatchDrainer<T, Q, F, H>
where
    T: Send + 'static,
    Q: Queue<T>,
    F: Fn(T) -> Result<(), TaskError> + Send + Sync + 'static,
    H: Fn() + Send + Sync + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, ctx: CancellationToken) -> Result<(), TaskError> {
        let drain_limit = self.cfg.drain_limit();
        let mut batch: Vec<T> = Vec::with_capacity(self.cfg.max_batch_clamped());

        while !self.queue.is_empty().await || !ctx.is_cancelled() {
            self.queue.drain_to(&mut batch, drain_limit).await;
            // Counts an item carried over from the idle wait.
            let batch_size = batch.len();

            self.process(&mut batch)?;

            if batch_size == 0 {
                match timed_take(&self.queue, self.cfg.idle_timeout, &ctx).await {
                    Some(item) => batch.push(item),
                    None => self.heartbeat(),
                }
            }
        }

        debug!(reader = %self.name, "queue empty and cancellation requested; reader stopping");
        Ok(())
    }
}

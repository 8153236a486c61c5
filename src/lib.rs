//! # batchvisor
//!
//! **Batchvisor** is a small set of concurrency primitives for a
//! single-consumer, bounded-queue pipeline on tokio:
//!
//! - drain items in bounded micro-batches for throughput,
//! - emit a periodic heartbeat while the queue is idle,
//! - keep the consumer alive forever by respawning it after any uncaught failure.
//!
//! ## Architecture
//! ```text
//!   producer   producer   producer
//!       │          │          │       timed_put / put_timeout
//!       ▼          ▼          ▼
//! ┌────────────────────────────────────┐
//! │   BoundedQueue<T> (capacity N)     │
//! └─────────────────┬──────────────────┘
//!                   │ drain_to(≤ max_batch-1) / timed_take(idle_timeout)
//!                   ▼
//! ┌────────────────────────────────────┐        ┌─────────────────────────┐
//! │ MicroBatchDrainer (Task)           │──────► │ on_item(T) per item     │
//! │  batch ≤ 100, heartbeat when idle  │──────► │ on_heartbeat()          │
//! └─────────────────┬──────────────────┘        └─────────────────────────┘
//!                   │ Ok / Err / panic
//!                   ▼
//! ┌────────────────────────────────────┐
//! │ Supervisor: ReaderActor loop       │
//! │  cleanup() after every execution   │
//! │  Err/panic → warn! + respawn       │
//! │  Ok        → stop                  │
//! └────────────────────────────────────┘
//! ```
//!
//! ## Stopping
//! Cancellation is advisory: a cancelled drainer keeps going until it sees an
//! empty queue, then returns normally, which ends supervision.
//!
//! ## Delivery
//! At-most-once per batch: when the per-item action fails, the rest of that
//! batch is dropped. Items still in the queue are picked up by the respawned
//! reader.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use batchvisor::{BoundedQueue, TaskError, micro_batch_drainer_with_heartbeat, supervise, timed_put};
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let queue = BoundedQueue::new(1024);
//!
//!     let reader = micro_batch_drainer_with_heartbeat(
//!         queue.clone(),
//!         |event: String| {
//!             if event.is_empty() {
//!                 return Err(TaskError::fail("empty event"));
//!             }
//!             println!("{event}");
//!             Ok(())
//!         },
//!         || println!("still alive"),
//!     )
//!     .named("events")
//!     .arc();
//!
//!     let handle = supervise(&tokio::runtime::Handle::current(), reader, || {});
//!
//!     let ctx = CancellationToken::new();
//!     assert!(timed_put(&queue, "hello".to_string(), Duration::from_secs(1), &ctx).await);
//!
//!     handle.shutdown().await.unwrap();
//! }
//! ```
mod config;
mod core;
mod drain;
mod error;
mod events;
mod io;
mod queue;
mod tasks;

// ---- Public re-exports ----

pub use config::{DrainConfig, SupervisorConfig};
pub use core::{CleanupRef, ReaderHandle, Supervisor, schedule_reader, supervise};
pub use drain::{
    MicroBatchDrainer, NoHeartbeat, micro_batch_drainer, micro_batch_drainer_with_heartbeat,
};
pub use error::{PutError, RuntimeError, TaskError};
pub use events::{Bus, Event, EventKind};
pub use io::{did_raise_io_failure, try_did_raise_io_failure};
pub use queue::{BoundedQueue, Queue, timed_put, timed_take};
pub use tasks::{Task, TaskFn, TaskRef};

//! # Supervisor: keeps queue readers alive on a worker pool.
//!
//! [`Supervisor`] owns the event bus, a runtime cancellation token and the
//! [`SupervisorConfig`]. Each supervise call spawns a reader actor that runs
//! the reader on the pool, runs the cleanup after every execution and
//! respawns the reader whenever it ends with an uncaught failure.
//!
//! ## Wiring
//! ```text
//! supervise(pool, reader, cleanup)
//!     └──► pool.spawn(ReaderActor::run(child token))
//!              └──► loop: pool.spawn(run_once) ──► Ok  → stop
//!                                              └─► Err → warn!, respawn
//!
//! ReaderHandle ── cancel() ──► child token (advisory; reader drains first)
//! Supervisor   ── cancel_all() ──► runtime token → every child
//! ```
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use batchvisor::{BoundedQueue, Queue, Supervisor, SupervisorConfig, TaskError, micro_batch_drainer};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let queue = BoundedQueue::new(1024);
//!     let reader = micro_batch_drainer(queue.clone(), |n: u64| {
//!         println!("got {n}");
//!         Ok::<_, TaskError>(())
//!     })
//!     .arc();
//!
//!     let sup = Supervisor::new(SupervisorConfig::default());
//!     let handle = sup.schedule_reader(&tokio::runtime::Handle::current(), reader);
//!
//!     for n in 0..10 {
//!         queue.put_timeout(n, Duration::from_secs(1)).await?;
//!     }
//!     handle.shutdown().await?;
//!     Ok(())
//! }
//! ```

use std::sync::Arc;

use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::{
    config::SupervisorConfig,
    core::{CleanupRef, ReaderHandle, actor::ReaderActor},
    events::Bus,
    tasks::TaskRef,
};

/// Coordinates supervised readers and publishes their lifecycle events.
pub struct Supervisor {
    cfg: SupervisorConfig,
    bus: Bus,
    runtime_token: CancellationToken,
}

impl Supervisor {
    /// Creates a supervisor with the given configuration.
    pub fn new(cfg: SupervisorConfig) -> Self {
        let bus = Bus::new(cfg.bus_capacity_clamped());
        Self {
            cfg,
            bus,
            runtime_token: CancellationToken::new(),
        }
    }

    /// Event bus carrying reader lifecycle events.
    ///
    /// Hand a clone to [`MicroBatchDrainer::with_bus`](crate::MicroBatchDrainer::with_bus)
    /// to get batch and heartbeat events on the same channel.
    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// Active configuration.
    pub fn config(&self) -> &SupervisorConfig {
        &self.cfg
    }

    /// Runs `reader` on `pool`, runs `cleanup` after each execution, and
    /// respawns the reader after every uncaught failure.
    ///
    /// Fire-and-forget: the returned handle may be dropped.
    pub fn supervise<C>(&self, pool: &Handle, reader: TaskRef, cleanup: C) -> ReaderHandle
    where
        C: Fn() + Send + Sync + 'static,
    {
        self.spawn_actor(pool, reader, Arc::new(cleanup))
    }

    /// Like [`supervise`](Self::supervise) with a cleanup that only logs the
    /// worker thread that finished an execution.
    pub fn schedule_reader(&self, pool: &Handle, reader: TaskRef) -> ReaderHandle {
        self.spawn_actor(pool, reader, Arc::new(log_unhandled_cleanup))
    }

    /// Requests every reader started by this supervisor to stop.
    pub fn cancel_all(&self) {
        self.runtime_token.cancel();
    }

    fn spawn_actor(&self, pool: &Handle, reader: TaskRef, cleanup: CleanupRef) -> ReaderHandle {
        let name: Arc<str> = Arc::from(reader.name());
        let token = self.runtime_token.child_token();
        let actor = ReaderActor {
            reader,
            cleanup,
            pool: pool.clone(),
            bus: self.bus.clone(),
        };
        let join = pool.spawn(actor.run(token.clone()));
        ReaderHandle::new(name, token, join, self.cfg.grace)
    }
}

impl Default for Supervisor {
    fn default() -> Self {
        Self::new(SupervisorConfig::default())
    }
}

/// Supervises `reader` on `pool` with a default [`Supervisor`].
///
/// See [`Supervisor::supervise`].
pub fn supervise<C>(pool: &Handle, reader: TaskRef, cleanup: C) -> ReaderHandle
where
    C: Fn() + Send + Sync + 'static,
{
    Supervisor::default().supervise(pool, reader, cleanup)
}

/// Supervises `reader` on `pool` with the default logging cleanup.
///
/// See [`Supervisor::schedule_reader`].
pub fn schedule_reader(pool: &Handle, reader: TaskRef) -> ReaderHandle {
    Supervisor::default().schedule_reader(pool, reader)
}

fn log_unhandled_cleanup() {
    let thread = std::thread::current();
    debug!(
        thread = thread.name().unwrap_or("<unnamed>"),
        thread_id = ?thread.id(),
        "unhandled cleanup for queue reader thread"
    );
}

//! # ReaderActor: keeps one reader alive.
//!
//! Owns the supervision loop for a single reader/cleanup pair. Instead of
//! rescheduling from inside a completion callback, the actor loops:
//!
//! ```text
//! loop {
//!   ├─► attempt += 1, publish ReaderStarting
//!   ├─► pool.spawn(run_once(reader, cleanup)) ──► await completion
//!   │       ├─ Ok            ─► publish ReaderStopped, exit
//!   │       ├─ Canceled      ─► same as Ok once the token is cancelled
//!   │       ├─ Err / panic   ─► warn!, publish ReaderFailed, respawn now
//!   │       └─ aborted       ─► exit (runtime shutting down)
//! }
//! ```
//!
//! ## Rules
//! - Executions are strictly sequential: a new one is spawned only after the
//!   previous one, cleanup included, has completed.
//! - No delay and no retry limit between respawns.
//! - All executions share the reader's cancellation token.

use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::{
    core::{CleanupRef, runner::run_once},
    error::TaskError,
    events::{Bus, Event, EventKind},
    tasks::TaskRef,
};

/// Supervision loop for one reader.
pub(crate) struct ReaderActor {
    pub(crate) reader: TaskRef,
    pub(crate) cleanup: CleanupRef,
    pub(crate) pool: Handle,
    pub(crate) bus: Bus,
}

impl ReaderActor {
    /// Runs executions of the reader until one completes normally.
    pub(crate) async fn run(self, ctx: CancellationToken) {
        let name = self.reader.name().to_string();
        let mut attempt: u32 = 0;

        loop {
            attempt = attempt.saturating_add(1);
            self.bus.publish(
                Event::new(EventKind::ReaderStarting)
                    .with_reader(name.as_str())
                    .with_attempt(attempt),
            );

            let execution = self.pool.spawn(run_once(
                self.reader.clone(),
                self.cleanup.clone(),
                ctx.clone(),
                attempt,
                self.bus.clone(),
            ));

            let reason = match execution.await {
                Ok(Ok(())) => {
                    debug!(reader = %name, attempt, "queue reader finished");
                    self.stopped(&name, attempt);
                    return;
                }
                // A reader giving up on a cancelled token is a clean stop.
                Ok(Err(TaskError::Canceled)) if ctx.is_cancelled() => {
                    debug!(reader = %name, attempt, "queue reader canceled");
                    self.stopped(&name, attempt);
                    return;
                }
                Ok(Err(e)) => e.to_string(),
                Err(e) if e.is_cancelled() => {
                    debug!(reader = %name, attempt, "queue reader execution aborted; supervision ends");
                    return;
                }
                Err(e) => e.to_string(),
            };

            warn!(
                reader = %name,
                attempt,
                error = %reason,
                "uncaught failure in queue reader; respawning"
            );
            self.bus.publish(
                Event::new(EventKind::ReaderFailed)
                    .with_reader(name.as_str())
                    .with_attempt(attempt)
                    .with_reason(reason),
            );
        }
    }

    fn stopped(&self, name: &str, attempt: u32) {
        self.bus.publish(
            Event::new(EventKind::ReaderStopped)
                .with_reader(name)
                .with_attempt(attempt),
        );
    }
}

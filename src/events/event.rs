//! # Runtime events emitted by supervised readers and drain loops.
//!
//! [`EventKind`] classifies events into two groups:
//! - **Reader lifecycle**: one supervised execution starting, stopping or failing
//! - **Drain loop activity**: a processed batch, or a heartbeat while idle
//!
//! Each [`Event`] carries a globally monotonic sequence number (`seq`) to
//! restore ordering across receivers.
//!
//! ## Example
//! ```rust
//! use batchvisor::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::ReaderFailed)
//!     .with_reader("incoming")
//!     .with_attempt(3)
//!     .with_reason("execution failed: boom");
//!
//! assert_eq!(ev.kind, EventKind::ReaderFailed);
//! assert_eq!(ev.reader.as_deref(), Some("incoming"));
//! assert_eq!(ev.attempt, Some(3));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Reader lifecycle ===
    /// A new execution of the reader was submitted to the pool.
    ///
    /// Sets `reader`, `attempt` (1-based, per supervised reader).
    ReaderStarting,

    /// The reader returned normally; it will not be respawned.
    ///
    /// Sets `reader`, `attempt`.
    ReaderStopped,

    /// The reader ended with an uncaught failure; a fresh execution follows.
    ///
    /// Sets `reader`, `attempt`, `reason`.
    ReaderFailed,

    /// The cleanup action panicked after an execution completed.
    ///
    /// Sets `reader`, `attempt`, `reason`.
    CleanupPanicked,

    // === Drain loop activity ===
    /// A non-empty batch was fully handed to the per-item action.
    ///
    /// Sets `reader`, `batch_size`.
    BatchProcessed,

    /// The queue stayed empty for a whole idle timeout.
    ///
    /// Sets `reader`.
    Heartbeat,
}

/// Runtime event with optional metadata.
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,
    /// Name of the reader, if applicable.
    pub reader: Option<Arc<str>>,
    /// Execution attempt (starting from 1).
    pub attempt: Option<u32>,
    /// Human-readable failure reason.
    pub reason: Option<Arc<str>>,
    /// Number of items in a processed batch.
    pub batch_size: Option<usize>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            reader: None,
            attempt: None,
            reason: None,
            batch_size: None,
        }
    }

    /// Attaches a reader name.
    #[inline]
    pub fn with_reader(mut self, reader: impl Into<Arc<str>>) -> Self {
        self.reader = Some(reader.into());
        self
    }

    /// Attaches an attempt number.
    #[inline]
    pub fn with_attempt(mut self, n: u32) -> Self {
        self.attempt = Some(n);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches a batch size.
    #[inline]
    pub fn with_batch_size(mut self, n: usize) -> Self {
        self.batch_size = Some(n);
        self
    }
}

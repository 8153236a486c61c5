//! # Runtime configuration.
//!
//! Two plain settings structs:
//! - [`SupervisorConfig`] for the supervision runtime (event bus, shutdown grace);
//! - [`DrainConfig`] for a single micro-batch drain loop (batch bound, idle timeout).
//!
//! ## Sentinel values
//! - `bus_capacity = 0` → clamped to 1 by [`SupervisorConfig::bus_capacity_clamped`]
//! - `max_batch < 2` → clamped to 2 by [`DrainConfig::max_batch_clamped`]
//!   (one slot for a carried item, at least one for the bulk-drain)
//!
//! # Example
//! ```
//! use std::time::Duration;
//! use batchvisor::{DrainConfig, SupervisorConfig};
//!
//! let mut cfg = SupervisorConfig::default();
//! cfg.grace = Duration::from_secs(5);
//!
//! let drain = DrainConfig {
//!     max_batch: 500,
//!     idle_timeout: Duration::from_millis(250),
//! };
//! assert_eq!(drain.drain_limit(), 499);
//! ```

use std::time::Duration;

/// Configuration for the supervision runtime.
#[derive(Clone, Debug)]
pub struct SupervisorConfig {
    /// Capacity of the event bus broadcast ring buffer.
    ///
    /// Receivers lagging more than `bus_capacity` events skip the oldest ones.
    pub bus_capacity: usize,

    /// How long [`ReaderHandle::shutdown`](crate::ReaderHandle::shutdown) waits
    /// for a cancelled reader to drain and stop when no explicit grace is given.
    pub grace: Duration,
}

impl SupervisorConfig {
    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for SupervisorConfig {
    /// - `bus_capacity = 1024`
    /// - `grace = 30s`
    fn default() -> Self {
        Self {
            bus_capacity: 1024,
            grace: Duration::from_secs(30),
        }
    }
}

/// Configuration for a micro-batch drain loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DrainConfig {
    /// Upper bound on the number of items handed to the per-item action in one batch.
    pub max_batch: usize,

    /// How long an idle loop blocks for a single item before firing a heartbeat.
    pub idle_timeout: Duration,
}

impl DrainConfig {
    /// Batch bound clamped to a minimum of 2.
    #[inline]
    pub fn max_batch_clamped(&self) -> usize {
        self.max_batch.max(2)
    }

    /// Number of items a single bulk-drain may move into the batch.
    ///
    /// One slot is always left for an item carried over from the idle wait.
    #[inline]
    pub fn drain_limit(&self) -> usize {
        self.max_batch_clamped() - 1
    }
}

impl Default for DrainConfig {
    /// - `max_batch = 100`
    /// - `idle_timeout = 1s`
    fn default() -> Self {
        Self {
            max_batch: 100,
            idle_timeout: Duration::from_secs(1),
        }
    }
}

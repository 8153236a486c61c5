//! # Bounded queues and cancellation-transparent access.
//!
//! - [`Queue`] - the contract a drain loop consumes (timed put, timed take,
//!   non-blocking bulk-drain).
//! - [`BoundedQueue`] - the stock lock-free implementation over `crossbeam_queue::ArrayQueue`.
//! - [`timed_take`] / [`timed_put`] - "quiet" blocking ops that turn
//!   cancellation into a sentinel instead of an error.
//!
//! ## Architecture
//! ```text
//! producer ─┐
//! producer ─┼──► BoundedQueue (ArrayQueue, capacity N) ──► drain_to / take_timeout ──► reader(s)
//! producer ─┘      FIFO, waits on Notify, no locks
//! ```

mod bounded;
mod quiet;

use std::time::Duration;

use async_trait::async_trait;

use crate::error::PutError;

pub use bounded::BoundedQueue;
pub use quiet::{timed_put, timed_take};

/// Multi-producer queue with finite capacity.
///
/// ### Rules
/// - Items put by one producer are taken in the order they were put.
/// - No ordering is promised across producers.
/// - [`drain_to`](Queue::drain_to), [`is_empty`](Queue::is_empty) and
///   [`len`](Queue::len) never wait, not even while another consumer is
///   blocked in [`take_timeout`](Queue::take_timeout).
#[async_trait]
pub trait Queue<T: Send + 'static>: Send + Sync + 'static {
    /// Enqueues `item`, waiting at most `timeout` for free capacity.
    async fn put_timeout(&self, item: T, timeout: Duration) -> Result<(), PutError<T>>;

    /// Dequeues one item, waiting at most `timeout` for one to arrive.
    async fn take_timeout(&self, timeout: Duration) -> Option<T>;

    /// Moves up to `max` immediately available items to the end of `batch`.
    ///
    /// Returns how many items were moved.
    async fn drain_to(&self, batch: &mut Vec<T>, max: usize) -> usize;

    /// Returns `true` if no item is currently buffered.
    async fn is_empty(&self) -> bool;

    /// Returns the number of currently buffered items.
    async fn len(&self) -> usize;
}

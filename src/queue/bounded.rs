//! # `BoundedQueue`: lock-free [`Queue`] shared by producers and readers.
//!
//! Items live in a fixed-size `crossbeam_queue::ArrayQueue`. Waiting is done
//! outside the queue on two [`Notify`]s, `not_empty` for takers and
//! `not_full` for putters, so no consumer-side call ever blocks another one:
//! a reader parked in [`take_timeout`](Queue::take_timeout) does not delay a
//! second reader's [`drain_to`](Queue::drain_to) or a [`len`](Queue::len)
//! query. A reader that dies leaves every item not yet drained in place for
//! the next execution.
//!
//! ## Waiting
//! ```text
//! put:  enable(not_full)  ──► push ok?  ──► notify not_empty, done
//!                                └─ full ──► wait not_full until deadline, retry
//! take: enable(not_empty) ──► pop some? ──► notify not_full, done
//!                                └─ empty ─► wait not_empty until deadline, retry
//! ```

use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use crossbeam_queue::ArrayQueue;
use tokio::sync::Notify;
use tokio::sync::futures::Notified;
use tokio::time::{self, Instant};

use crate::error::PutError;
use crate::queue::Queue;

/// Bounded multi-producer, multi-consumer FIFO queue.
///
/// Clones are handles to the same queue.
///
/// # Example
/// ```
/// use std::time::Duration;
/// use batchvisor::{BoundedQueue, Queue};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let queue = BoundedQueue::new(8);
/// queue.put_timeout(1, Duration::from_millis(10)).await.unwrap();
/// queue.put_timeout(2, Duration::from_millis(10)).await.unwrap();
///
/// let mut batch = Vec::new();
/// assert_eq!(queue.drain_to(&mut batch, 99).await, 2);
/// assert_eq!(batch, vec![1, 2]);
/// # }
/// ```
pub struct BoundedQueue<T> {
    shared: Arc<Shared<T>>,
}

struct Shared<T> {
    items: ArrayQueue<T>,
    not_empty: Notify,
    not_full: Notify,
}

impl<T> Clone for BoundedQueue<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T: Send + 'static> BoundedQueue<T> {
    /// Creates a queue holding at most `capacity` items (minimum 1).
    pub fn new(capacity: usize) -> Self {
        Self {
            shared: Arc::new(Shared {
                items: ArrayQueue::new(capacity.max(1)),
                not_empty: Notify::new(),
                not_full: Notify::new(),
            }),
        }
    }

    /// Maximum number of buffered items.
    pub fn capacity(&self) -> usize {
        self.shared.items.capacity()
    }

    /// Enqueues `item` only if there is free capacity right now.
    ///
    /// A full queue is reported as [`PutError::Timeout`] (a zero-length wait).
    pub fn try_put(&self, item: T) -> Result<(), PutError<T>> {
        self.push(item).map_err(PutError::Timeout)
    }

    fn push(&self, item: T) -> Result<(), T> {
        self.shared.items.push(item)?;
        self.shared.not_empty.notify_one();
        Ok(())
    }

    fn pop(&self) -> Option<T> {
        let item = self.shared.items.pop()?;
        self.shared.not_full.notify_one();
        Some(item)
    }
}

/// Waits for a notification; `false` once `deadline` passed first.
///
/// `None` is a deadline too far away to represent.
async fn wait_until(notified: Pin<&mut Notified<'_>>, deadline: Option<Instant>) -> bool {
    match deadline {
        Some(deadline) => time::timeout_at(deadline, notified).await.is_ok(),
        None => {
            notified.await;
            true
        }
    }
}

#[async_trait]
impl<T: Send + 'static> Queue<T> for BoundedQueue<T> {
    async fn put_timeout(&self, mut item: T, timeout: Duration) -> Result<(), PutError<T>> {
        let deadline = Instant::now().checked_add(timeout);
        loop {
            // Registered before the push attempt so a pop in between is not missed.
            let notified = self.shared.not_full.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            match self.push(item) {
                Ok(()) => return Ok(()),
                Err(rejected) => item = rejected,
            }
            if !wait_until(notified, deadline).await {
                return Err(PutError::Timeout(item));
            }
        }
    }

    async fn take_timeout(&self, timeout: Duration) -> Option<T> {
        let deadline = Instant::now().checked_add(timeout);
        loop {
            let notified = self.shared.not_empty.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if let Some(item) = self.pop() {
                return Some(item);
            }
            if !wait_until(notified, deadline).await {
                return None;
            }
        }
    }

    async fn drain_to(&self, batch: &mut Vec<T>, max: usize) -> usize {
        let mut moved = 0;
        while moved < max {
            match self.pop() {
                Some(item) => {
                    batch.push(item);
                    moved += 1;
                }
                None => break,
            }
        }
        moved
    }

    async fn is_empty(&self) -> bool {
        self.shared.items.is_empty()
    }

    async fn len(&self) -> usize {
        self.shared.items.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHORT: Duration = Duration::from_millis(10);

    #[tokio::test]
    async fn test_drain_respects_max_and_order() {
        let queue = BoundedQueue::new(16);
        for i in 0..10 {
            queue.put_timeout(i, SHORT).await.unwrap();
        }

        let mut batch = vec![100];
        assert_eq!(queue.drain_to(&mut batch, 4).await, 4);
        assert_eq!(batch, vec![100, 0, 1, 2, 3]);
        assert_eq!(queue.len().await, 6);

        batch.clear();
        assert_eq!(queue.drain_to(&mut batch, 99).await, 6);
        assert_eq!(batch, vec![4, 5, 6, 7, 8, 9]);
        assert!(queue.is_empty().await);
    }

    #[tokio::test]
    async fn test_drain_empty_queue_does_not_block() {
        let queue = BoundedQueue::<u8>::new(4);
        let mut batch = Vec::new();
        assert_eq!(queue.drain_to(&mut batch, 99).await, 0);
        assert!(batch.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_put_times_out_when_full() {
        let queue = BoundedQueue::new(1);
        queue.put_timeout("a", SHORT).await.unwrap();

        let err = queue.put_timeout("b", Duration::from_secs(1)).await.unwrap_err();
        assert!(matches!(err, PutError::Timeout("b")));
        assert_eq!(queue.len().await, 1);
        assert!(matches!(queue.try_put("c"), Err(PutError::Timeout("c"))));
        assert_eq!(queue.capacity(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_take_times_out_when_empty() {
        let queue = BoundedQueue::<u8>::new(1);
        assert_eq!(queue.take_timeout(Duration::from_secs(1)).await, None);
    }

    #[tokio::test]
    async fn test_take_waits_for_producer() {
        let queue = BoundedQueue::new(1);
        let producer = queue.clone();
        tokio::spawn(async move {
            tokio::time::sleep(SHORT).await;
            producer.put_timeout(9, SHORT).await.unwrap();
        });
        assert_eq!(queue.take_timeout(Duration::from_secs(5)).await, Some(9));
    }

    #[tokio::test(start_paused = true)]
    async fn test_blocked_put_resumes_after_take() {
        let queue = BoundedQueue::new(1);
        queue.try_put(1).unwrap();

        let producer = queue.clone();
        let put = tokio::spawn(async move { producer.put_timeout(2, Duration::from_secs(5)).await });

        tokio::time::sleep(SHORT).await;
        assert_eq!(queue.take_timeout(SHORT).await, Some(1));
        assert!(put.await.unwrap().is_ok());
        assert_eq!(queue.take_timeout(SHORT).await, Some(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_reader_does_not_stall_other_consumers() {
        let queue = BoundedQueue::<u32>::new(8);

        let reader = queue.clone();
        let parked =
            tokio::spawn(async move { reader.take_timeout(Duration::from_secs(5)).await });
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!parked.is_finished());

        // None of these may wait for the parked reader's timeout.
        let quick = Duration::from_millis(1);
        assert_eq!(time::timeout(quick, queue.len()).await, Ok(0));
        assert_eq!(time::timeout(quick, queue.is_empty()).await, Ok(true));

        queue.try_put(7).unwrap();
        queue.try_put(8).unwrap();
        let mut batch = Vec::new();
        let moved = time::timeout(quick, queue.drain_to(&mut batch, 99)).await;
        assert!(moved.is_ok());

        // The parked reader and the second consumer split the two items.
        let taken = parked.await.unwrap();
        let mut all: Vec<u32> = taken.into_iter().chain(batch).collect();
        all.sort_unstable();
        assert_eq!(all, vec![7, 8]);
    }
}

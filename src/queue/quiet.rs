//! # Quiet blocking ops.
//!
//! Timed take/put that never surface cancellation as an error. When the
//! caller's [`CancellationToken`] fires (or has already fired) the call
//! returns its sentinel (`None` / `false`) exactly as if it had timed out.
//! The token is left cancelled, so cooperative code further up can still
//! observe the request.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::queue::Queue;

/// Takes one item, waiting at most `timeout`.
///
/// Returns `None` on timeout or when `ctx` is cancelled.
pub async fn timed_take<T, Q>(queue: &Q, timeout: Duration, ctx: &CancellationToken) -> Option<T>
where
    T: Send + 'static,
    Q: Queue<T> + ?Sized,
{
    if ctx.is_cancelled() {
        return None;
    }
    tokio::select! {
        biased;
        _ = ctx.cancelled() => None,
        item = queue.take_timeout(timeout) => item,
    }
}

/// Puts `item`, waiting at most `timeout` for capacity.
///
/// Returns `false` on timeout or when `ctx` is cancelled;
/// the item is dropped in that case. Use [`Queue::put_timeout`] directly to
/// get a rejected item back.
pub async fn timed_put<T, Q>(
    queue: &Q,
    item: T,
    timeout: Duration,
    ctx: &CancellationToken,
) -> bool
where
    T: Send + 'static,
    Q: Queue<T> + ?Sized,
{
    if ctx.is_cancelled() {
        return false;
    }
    tokio::select! {
        biased;
        _ = ctx.cancelled() => false,
        res = queue.put_timeout(item, timeout) => match res {
            Ok(()) => true,
            Err(e) => {
                tracing::trace!(reason = e.as_label(), "quiet put rejected");
                false
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::BoundedQueue;

    const LONG: Duration = Duration::from_secs(60);

    #[tokio::test]
    async fn test_take_returns_available_item() {
        let queue = BoundedQueue::new(2);
        let ctx = CancellationToken::new();
        assert!(timed_put(&queue, 5, LONG, &ctx).await);
        assert_eq!(timed_take(&queue, LONG, &ctx).await, Some(5));
    }

    #[tokio::test(start_paused = true)]
    async fn test_take_times_out_quietly() {
        let queue = BoundedQueue::<u8>::new(2);
        let ctx = CancellationToken::new();
        assert_eq!(timed_take(&queue, Duration::from_secs(1), &ctx).await, None);
        assert!(!ctx.is_cancelled());
    }

    #[tokio::test]
    async fn test_cancel_while_blocked_take_returns_none() {
        let queue = BoundedQueue::<u8>::new(2);
        let ctx = CancellationToken::new();

        let canceller = ctx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            canceller.cancel();
        });

        assert_eq!(timed_take(&queue, LONG, &ctx).await, None);
        assert!(ctx.is_cancelled());
    }

    #[tokio::test]
    async fn test_already_cancelled_take_skips_items() {
        let queue = BoundedQueue::new(2);
        queue.try_put(1).unwrap();
        let ctx = CancellationToken::new();
        ctx.cancel();

        assert_eq!(timed_take(&queue, LONG, &ctx).await, None);
        assert_eq!(queue.len().await, 1);
    }

    #[tokio::test]
    async fn test_cancel_while_blocked_put_returns_false() {
        let queue = BoundedQueue::new(1);
        queue.try_put(1).unwrap();
        let ctx = CancellationToken::new();

        let canceller = ctx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            canceller.cancel();
        });

        assert!(!timed_put(&queue, 2, LONG, &ctx).await);
        assert!(ctx.is_cancelled());
        assert_eq!(queue.len().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_put_on_full_queue_returns_false() {
        let queue = BoundedQueue::new(1);
        let ctx = CancellationToken::new();
        assert!(timed_put(&queue, 1, Duration::from_secs(1), &ctx).await);
        assert!(!timed_put(&queue, 2, Duration::from_secs(1), &ctx).await);
    }
}

//! # Run a single execution of a reader.
//!
//! Executes one [`Task::run`] on a pool worker, converts a panic into
//! [`TaskError::Panicked`], then runs the cleanup action exactly once on the
//! same worker.
//!
//! ## Flow
//! ```text
//! reader.run(ctx) ──► Ok / Err / panic ──► cleanup() ──► return Ok / Err
//!                                            └─ panic → error! + CleanupPanicked (outcome unchanged)
//! ```

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use futures::FutureExt;
use tokio_util::sync::CancellationToken;
use tracing::error;

use crate::{
    core::CleanupRef,
    error::TaskError,
    events::{Bus, Event, EventKind},
    tasks::TaskRef,
};

/// Runs `reader` once, then `cleanup`, returning the reader's outcome.
pub(crate) async fn run_once(
    reader: TaskRef,
    cleanup: CleanupRef,
    ctx: CancellationToken,
    attempt: u32,
    bus: Bus,
) -> Result<(), TaskError> {
    let res = match AssertUnwindSafe(reader.run(ctx)).catch_unwind().await {
        Ok(res) => res,
        Err(payload) => Err(TaskError::Panicked {
            info: panic_message(payload.as_ref()),
        }),
    };

    if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| cleanup())) {
        let info = panic_message(payload.as_ref());
        error!(reader = reader.name(), attempt, info = %info, "cleanup action panicked");
        bus.publish(
            Event::new(EventKind::CleanupPanicked)
                .with_reader(reader.name())
                .with_attempt(attempt)
                .with_reason(info),
        );
    }
    res
}

/// Renders a panic payload as text.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::TaskFn;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_cleanup() -> (Arc<AtomicUsize>, CleanupRef) {
        let count = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&count);
        let cleanup: CleanupRef = Arc::new(move || {
            c.fetch_add(1, Ordering::SeqCst);
        });
        (count, cleanup)
    }

    #[tokio::test]
    async fn test_cleanup_runs_once_after_success() {
        let (count, cleanup) = counting_cleanup();
        let reader = TaskFn::arc("ok", |_ctx: CancellationToken| async { Ok::<(), TaskError>(()) });

        let res = run_once(reader, cleanup, CancellationToken::new(), 1, Bus::new(4)).await;
        assert!(res.is_ok());
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_panic_becomes_error_and_cleanup_still_runs() {
        let (count, cleanup) = counting_cleanup();
        let reader = TaskFn::arc("panicky", |_ctx: CancellationToken| async {
            if true {
                panic!("boom");
            }
            Ok::<(), TaskError>(())
        });

        let err = run_once(reader, cleanup, CancellationToken::new(), 1, Bus::new(4))
            .await
            .unwrap_err();
        assert!(matches!(err, TaskError::Panicked { ref info } if info == "boom"));
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_cleanup_panic_is_reported_not_propagated() {
        let bus = Bus::new(4);
        let mut rx = bus.subscribe();
        let reader = TaskFn::arc("ok", |_ctx: CancellationToken| async { Ok::<(), TaskError>(()) });
        fn exploding_cleanup() {
            panic!("cleanup exploded");
        }
        let cleanup: CleanupRef = Arc::new(exploding_cleanup);

        let res = run_once(reader, cleanup, CancellationToken::new(), 3, bus).await;
        assert!(res.is_ok());

        let ev = rx.recv().await.unwrap();
        assert_eq!(ev.kind, EventKind::CleanupPanicked);
        assert_eq!(ev.attempt, Some(3));
        assert_eq!(ev.reason.as_deref(), Some("cleanup exploded"));
    }

    #[test]
    fn test_panic_message_formats() {
        let s: Box<dyn Any + Send> = Box::new("static");
        assert_eq!(panic_message(s.as_ref()), "static");
        let s: Box<dyn Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(s.as_ref()), "owned");
        let s: Box<dyn Any + Send> = Box::new(42u8);
        assert_eq!(panic_message(s.as_ref()), "unknown panic");
    }
}
